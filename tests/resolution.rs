//! Resolution wait and block watcher against an in-memory chain.

use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, B256};
use asset_sweeper::lifecycle::Shutdown;
use asset_sweeper::relay::{BundleResolution, SignedBundle, SignedTransaction};
use asset_sweeper::sweep::{wait_for_resolution, BlockWatcher, ResolutionOptions};

mod common;

use common::FakeChain;

const SPONSOR: Address = address!("1111111111111111111111111111111111111111");
const VICTIM: Address = address!("2222222222222222222222222222222222222222");

fn bundle(target_block: u64) -> SignedBundle {
    let tx = |from: Address, nonce: u64, tag: u8| SignedTransaction {
        hash: B256::repeat_byte(tag),
        raw: Bytes::from(vec![tag]),
        from,
        nonce,
    };
    SignedBundle {
        target_block,
        transactions: vec![tx(SPONSOR, 5, 1), tx(VICTIM, 9, 2), tx(VICTIM, 10, 3)],
    }
}

fn options(timeout_ms: u64) -> ResolutionOptions {
    ResolutionOptions {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_millis(timeout_ms),
    }
}

fn chain_at(head: u64) -> FakeChain {
    let chain = FakeChain::new(head);
    chain.set_nonce(SPONSOR, 5);
    chain.set_nonce(VICTIM, 9);
    chain
}

#[tokio::test]
async fn test_all_hashes_in_target_block() {
    let chain = chain_at(100);
    let bundle = bundle(101);
    let mut hashes = bundle.hashes();
    hashes.insert(1, B256::repeat_byte(0x99));
    chain.produce_block(101, hashes);

    let resolution = wait_for_resolution(&chain, &bundle, options(500)).await.unwrap();
    assert_eq!(resolution, BundleResolution::BundleIncluded);
}

#[tokio::test]
async fn test_partial_inclusion_is_a_miss() {
    let chain = chain_at(100);
    let bundle = bundle(101);
    chain.produce_block(101, bundle.hashes()[..2].to_vec());

    let resolution = wait_for_resolution(&chain, &bundle, options(500)).await.unwrap();
    assert_eq!(resolution, BundleResolution::BlockPassedWithoutInclusion);
}

#[tokio::test]
async fn test_nonce_moved_before_target() {
    let chain = chain_at(100);
    chain.bump_nonce(VICTIM);

    let resolution = wait_for_resolution(&chain, &bundle(101), options(500)).await.unwrap();
    assert_eq!(resolution, BundleResolution::AccountNonceTooHigh);
}

#[tokio::test]
async fn test_waits_for_target_block() {
    let chain = chain_at(100);
    let bundle = bundle(101);

    let producer = chain.clone();
    let hashes = bundle.hashes();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        producer.produce_block(101, hashes);
    });

    let resolution = wait_for_resolution(&chain, &bundle, options(1000)).await.unwrap();
    assert_eq!(resolution, BundleResolution::BundleIncluded);
}

#[tokio::test]
async fn test_unknown_target_block_keeps_polling() {
    let chain = chain_at(101);

    let resolution = wait_for_resolution(&chain, &bundle(101), options(50)).await.unwrap();
    assert_eq!(resolution, BundleResolution::TimedOut);
}

#[tokio::test]
async fn test_times_out_before_target() {
    let chain = chain_at(100);

    let resolution = wait_for_resolution(&chain, &bundle(105), options(50)).await.unwrap();
    assert_eq!(resolution, BundleResolution::TimedOut);
}

#[tokio::test]
async fn test_watcher_forwards_only_new_heights() {
    let chain = FakeChain::new(10);
    let shutdown = Shutdown::new();
    let watcher = BlockWatcher::new(chain.clone(), Duration::from_millis(5));
    let (mut blocks, handle) = watcher.spawn(16, shutdown.subscribe());

    assert_eq!(blocks.recv().await, Some(10));

    chain.set_head(9);
    tokio::time::sleep(Duration::from_millis(30)).await;
    chain.set_head(12);
    assert_eq!(blocks.recv().await, Some(12));

    shutdown.trigger();
    handle.await.unwrap();
    assert_eq!(blocks.recv().await, None);
}
