//! Integration tests for editor crate

use pagecraft_editor::{
    ApiCall, ApiError, ApiOp, BlockOrderUpdate, DragSource, DropPlan, DropTarget, GatewayError,
    InMemoryPageApi, MutationKind, NotificationLevel, Outcome, PageBuilder,
};
use pagecraft_model::{
    siblings, Block, BlockContent, BlockId, BlockKind, Page, PageDraft, PageId, TextContent,
};
use std::sync::Arc;
use std::time::Duration;

fn abc_page() -> Page {
    Page::new("p1", "Home", "home").with_blocks(vec![
        Block::new("A", BlockKind::Text).with_order(0),
        Block::new("B", BlockKind::Text).with_order(1),
        Block::new("C", BlockKind::Text).with_order(2),
    ])
}

async fn open(page: Page) -> (Arc<InMemoryPageApi>, PageBuilder) {
    let id = page.id.clone();
    let api = Arc::new(InMemoryPageApi::with_page(page));
    let builder = PageBuilder::with_api(api.clone());
    builder.open(&id).await.unwrap();
    api.clear_calls();
    (api, builder)
}

fn root_sequence(builder: &PageBuilder) -> Vec<String> {
    let blocks = builder.pages().blocks();
    siblings(&blocks, None)
        .into_iter()
        .map(|b| b.id.to_string())
        .collect()
}

#[tokio::test]
async fn test_drag_reorder_sends_one_pair_per_sibling() {
    let (api, mut builder) = open(abc_page()).await;

    builder.drag().drag_start(DragSource::Block(BlockId::from("A")));
    let plan = builder
        .drag()
        .drag_end(Some(DropTarget::Block(BlockId::from("C"))))
        .await
        .unwrap();

    assert!(matches!(plan, DropPlan::Reorder { .. }));
    assert_eq!(
        api.mutation_calls(),
        vec![ApiCall::ReorderBlocks(vec![
            BlockOrderUpdate::new("B", 0),
            BlockOrderUpdate::new("C", 1),
            BlockOrderUpdate::new("A", 2),
        ])]
    );
    assert_eq!(root_sequence(&builder), vec!["B", "C", "A"]);
}

#[tokio::test]
async fn test_add_before_save_makes_no_call() {
    let api = Arc::new(InMemoryPageApi::new());
    let builder = PageBuilder::with_api(api.clone());

    let result = builder
        .gateway()
        .add_block(BlockKind::Text, None, None, None)
        .await;

    assert_eq!(result, Err(GatewayError::PageNotSaved));
    assert!(api.calls().is_empty());
    let latest = builder.notifications().latest().unwrap();
    assert_eq!(latest.level, NotificationLevel::Error);
    assert_eq!(latest.message, "Please save the page first");
}

#[tokio::test]
async fn test_save_then_add() -> anyhow::Result<()> {
    let api = Arc::new(InMemoryPageApi::new());
    let builder = PageBuilder::with_api(api.clone());

    let page = builder
        .save(PageDraft {
            title: "Landing".to_string(),
            slug: "landing".to_string(),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.id, PageId::from("page-1"));
    assert!(page.created_at.is_some());

    builder
        .gateway()
        .add_block(BlockKind::Hero, None, None, None)
        .await?;
    assert_eq!(builder.pages().blocks().len(), 1);

    let mut draft = page.draft();
    draft.title = "Landing v2".to_string();
    builder.save(draft).await?;
    assert!(api
        .calls()
        .iter()
        .any(|call| matches!(call, ApiCall::UpdatePage(..))));
    assert_eq!(builder.page().unwrap().title, "Landing v2");
    Ok(())
}

#[tokio::test]
async fn test_container_and_child_depths() -> anyhow::Result<()> {
    let (_api, builder) = open(Page::new("p1", "Home", "home")).await;
    let gateway = builder.gateway();

    let container = gateway
        .add_block(BlockKind::Container, None, None, None)
        .await?;
    let first = gateway.add_child_block(&container.id, BlockKind::Text).await?;
    let second = gateway.add_child_block(&container.id, BlockKind::Image).await?;

    assert_eq!(container.depth, 0);
    assert_eq!(first.depth, 1);
    assert_eq!(first.parent_id.as_ref(), Some(&container.id));
    assert_eq!((first.order, second.order), (0, 1));
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_drop_makes_no_call() {
    let (api, mut builder) = open(abc_page()).await;

    builder.drag().drag_start(DragSource::Block(BlockId::from("A")));
    let plan = builder
        .drag()
        .drag_end(Some(DropTarget::Block(BlockId::from("gone"))))
        .await
        .unwrap();

    assert!(matches!(plan, DropPlan::Reject(_)));
    assert!(api.calls().is_empty());
    assert!(!builder.drag().is_dragging());

    let entry = builder.activity().recent(1).remove(0);
    assert_eq!(entry.kind, MutationKind::Drop);
    assert_eq!(entry.outcome, Outcome::Rejected);
    assert_eq!(
        builder.notifications().latest().unwrap().level,
        NotificationLevel::Warning
    );
}

#[tokio::test]
async fn test_drop_without_drag_is_ignored() {
    let (api, mut builder) = open(abc_page()).await;

    let plan = builder.drag().drag_end(Some(DropTarget::Canvas)).await.unwrap();

    assert!(!plan.is_mutation());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_cancelled_drag_does_nothing() {
    let (api, mut builder) = open(abc_page()).await;

    builder.drag().drag_start(DragSource::Palette(BlockKind::Spacer));
    builder
        .drag()
        .drag_over(Some(DropTarget::Block(BlockId::from("B"))));
    assert_eq!(builder.ui().hovered(), Some(BlockId::from("B")));

    builder.drag().cancel();
    let plan = builder.drag().drag_end(Some(DropTarget::Canvas)).await.unwrap();

    assert!(!plan.is_mutation());
    assert_eq!(builder.ui().hovered(), None);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_palette_drop_on_block_lands_after_it() {
    let (_api, mut builder) = open(abc_page()).await;

    builder.drag().drag_start(DragSource::Palette(BlockKind::Divider));
    builder
        .drag()
        .drag_end(Some(DropTarget::Block(BlockId::from("A"))))
        .await
        .unwrap();

    let sequence = root_sequence(&builder);
    assert_eq!(sequence.len(), 4);
    assert_eq!(sequence[0], "A");
    assert_eq!(sequence[2..].to_vec(), vec!["B", "C"]);
    let blocks = builder.pages().blocks();
    let inserted = blocks
        .iter()
        .find(|b| b.id.as_str() == sequence[1])
        .unwrap();
    assert_eq!(inserted.kind(), Some(BlockKind::Divider));
}

#[tokio::test]
async fn test_drop_into_container_moves_block() {
    let mut page = abc_page();
    page.blocks.push(Block::new("box", BlockKind::FlexColumn).with_order(3));
    let (_api, mut builder) = open(page).await;

    builder.drag().drag_start(DragSource::Block(BlockId::from("B")));
    builder
        .drag()
        .drag_end(Some(DropTarget::Container(BlockId::from("box"))))
        .await
        .unwrap();

    let moved = builder.pages().block(&BlockId::from("B")).unwrap();
    assert_eq!(moved.parent_id, Some(BlockId::from("box")));
    assert_eq!(moved.depth, 1);
    assert_eq!(root_sequence(&builder), vec!["A", "C", "box"]);
    let orders: Vec<i32> = siblings(&builder.pages().blocks(), None)
        .iter()
        .map(|b| b.order)
        .collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_failed_reorder_is_reconciled_by_refetch() {
    let (api, builder) = open(abc_page()).await;
    api.fail_next(ApiOp::ReorderBlocks, ApiError::Network("timeout".to_string()));

    let blocks = builder.pages().blocks();
    let reversed: Vec<Block> = blocks.iter().rev().cloned().collect();
    let result = builder.gateway().reorder_blocks(&reversed).await;

    assert!(result.is_err());
    assert_eq!(root_sequence(&builder), vec!["A", "B", "C"]);
    assert!(matches!(api.calls().last(), Some(ApiCall::GetPage(_))));
    assert_eq!(builder.activity().failures().len(), 1);
    assert_eq!(builder.notifications().errors().len(), 1);
}

#[tokio::test]
async fn test_concurrent_updates_settle_on_backend_state() {
    let page = abc_page();
    let api = Arc::new(InMemoryPageApi::with_page(page).with_latency(Duration::from_millis(5)));
    let builder = PageBuilder::with_api(api.clone());
    builder.open(&PageId::from("p1")).await.unwrap();

    let text = |s: &str| {
        BlockContent::Text(TextContent {
            content: s.to_string(),
        })
    };
    let a = BlockId::from("A");
    let c = BlockId::from("C");
    let (first, second) = futures::join!(
        builder.gateway().update_block(&a, text("first"), None),
        builder.gateway().update_block(&c, text("second"), None),
    );

    assert!(first.is_ok() && second.is_ok());
    assert_eq!(builder.gateway().in_flight(), 0);
    assert_eq!(builder.page(), api.page(&PageId::from("p1")));
    assert_eq!(builder.pages().block(&a).unwrap().content, text("first"));
    assert_eq!(builder.pages().block(&c).unwrap().content, text("second"));
}

async fn open_slow(page: Page, latency: Duration) -> (Arc<InMemoryPageApi>, PageBuilder) {
    let id = page.id.clone();
    let api = Arc::new(InMemoryPageApi::with_page(page).with_latency(latency));
    let builder = PageBuilder::with_api(api.clone());
    builder.open(&id).await.unwrap();
    (api, builder)
}

#[tokio::test]
async fn test_reorder_is_applied_before_the_server_answers() {
    let (api, builder) = open_slow(abc_page(), Duration::from_millis(50)).await;
    let reversed: Vec<Block> = builder.pages().blocks().into_iter().rev().collect();

    let gateway = builder.gateway().clone();
    let pending = tokio::spawn(async move { gateway.reorder_blocks(&reversed).await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(builder.gateway().in_flight(), 1);
    assert_eq!(root_sequence(&builder), vec!["C", "B", "A"]);
    let server = api.page(&PageId::from("p1")).unwrap();
    assert_eq!(server.block(&BlockId::from("A")).unwrap().order, 0);

    pending.await.unwrap().unwrap();
    assert_eq!(root_sequence(&builder), vec!["C", "B", "A"]);
    assert_eq!(builder.page(), api.page(&PageId::from("p1")));
}

#[tokio::test]
async fn test_update_waits_for_refetch() {
    let (_api, builder) = open_slow(abc_page(), Duration::from_millis(50)).await;
    let id = BlockId::from("A");
    let before = builder.pages().block(&id).unwrap().content;
    let updated = BlockContent::Text(TextContent {
        content: "Updated".to_string(),
    });

    let gateway = builder.gateway().clone();
    let (target, content) = (id.clone(), updated.clone());
    let pending = tokio::spawn(async move { gateway.update_block(&target, content, None).await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(builder.gateway().in_flight(), 1);
    assert_eq!(builder.pages().block(&id).unwrap().content, before);

    pending.await.unwrap().unwrap();
    assert_eq!(builder.pages().block(&id).unwrap().content, updated);
}

#[tokio::test]
async fn test_landing_template_builds_nested_tree() -> anyhow::Result<()> {
    let (_api, builder) = open(Page::new("p1", "Home", "home")).await;

    let created = builder.apply_template("landing").await?;

    assert_eq!(created.len(), 8);
    let blocks = builder.pages().blocks();
    let grid = blocks
        .iter()
        .find(|b| b.kind() == Some(BlockKind::Grid))
        .unwrap();
    assert_eq!(grid.depth, 1);
    let cells = pagecraft_model::children_of(&blocks, &grid.id);
    assert_eq!(cells.len(), 3);
    assert!(cells.iter().all(|c| c.depth == 2));
    assert_eq!(
        root_sequence(&builder).len(),
        4,
        "hero, section, divider and button are roots"
    );
    Ok(())
}
