// ==========================================
// 资源页集成测试
// ==========================================
// 测试目标: 加载、新增、编辑、删除、导入的乐观更新与失败回滚，
//           提示推送与工具栏意图
// ==========================================

mod helpers;

use fleet_dashboard::resource::{
    Bus, BusStatus, BusType, NoticeLevel, PageIntent, ResourceError, ResourcePage,
};
use fleet_dashboard::{logging, ImportStep};
use helpers::mock_config::MockConfig;
use helpers::mock_service::MockService;
use std::sync::Arc;
use test_helpers::{bus, csv_upload, sample_fleet};

async fn loaded_page() -> (ResourcePage<Bus, MockService<Bus>>, Arc<MockService<Bus>>) {
    logging::init_test();
    let service = Arc::new(MockService::new(sample_fleet()));
    let mut page = ResourcePage::new(service.clone(), &MockConfig::default());
    assert_eq!(page.reload().await.unwrap(), 6);
    page.drain_notices();
    (page, service)
}

fn table_ids(page: &ResourcePage<Bus, MockService<Bus>>) -> Vec<String> {
    page.table().row_ids().to_vec()
}

// ==========================================
// 加载
// ==========================================

#[tokio::test]
async fn test_reload_populates_table() {
    let (page, service) = loaded_page().await;
    assert_eq!(page.rows().len(), 6);
    assert_eq!(page.table().view().filtered_rows, 6);
    assert_eq!(service.calls(), vec!["list"]);
}

#[tokio::test]
async fn test_reload_failure_keeps_previous_rows() {
    let (mut page, service) = loaded_page().await;
    service.fail_next_calls(true);

    let err = page.reload().await.unwrap_err();
    assert!(matches!(err, ResourceError::Service(_)));
    assert_eq!(page.rows().len(), 6);

    let notices = page.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("service unavailable"));
}

// ==========================================
// 新增 / 编辑
// ==========================================

#[tokio::test]
async fn test_add_success() {
    let (mut page, service) = loaded_page().await;
    let new_bus = bus("b7", "GG-700-GG", BusType::DoubleDecker, BusStatus::Active, 90);

    let created = page.add(new_bus.clone()).await.unwrap();
    assert_eq!(created, new_bus);
    assert!(table_ids(&page).contains(&"b7".to_string()));
    assert_eq!(service.stored().len(), 7);

    let notices = page.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Success);

    // 双层巴士的分面计数随之更新
    let view = page.table().view();
    assert_eq!(view.facets[0].options[3].count, 1);
}

#[tokio::test]
async fn test_add_failure_rolls_back() {
    let (mut page, service) = loaded_page().await;
    service.fail_next_calls(true);

    let new_bus = bus("b7", "GG-700-GG", BusType::Coach, BusStatus::Active, 50);
    assert!(page.add(new_bus).await.is_err());

    assert_eq!(page.rows().len(), 6);
    assert!(!table_ids(&page).contains(&"b7".to_string()));
    assert_eq!(page.drain_notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_edit_replaces_row() {
    let (mut page, service) = loaded_page().await;
    let mut edited = sample_fleet()[1].clone();
    edited.status = BusStatus::Active;

    page.edit(edited.clone()).await.unwrap();
    let stored = page.table().row_by_id("b2").cloned();
    assert_eq!(stored, Some(edited));
    assert_eq!(service.calls(), vec!["list", "update"]);
}

#[tokio::test]
async fn test_edit_failure_restores_original() {
    let (mut page, service) = loaded_page().await;
    service.fail_next_calls(true);

    let mut edited = sample_fleet()[0].clone();
    edited.seats = 1;
    assert!(page.edit(edited).await.is_err());
    assert_eq!(page.table().row_by_id("b1").map(|b| b.seats), Some(55));
}

#[tokio::test]
async fn test_edit_unknown_row_skips_service() {
    let (mut page, service) = loaded_page().await;
    let ghost = bus("zz", "ZZ-999-ZZ", BusType::Coach, BusStatus::Active, 10);

    assert!(matches!(
        page.edit(ghost).await,
        Err(ResourceError::NotFound(_))
    ));
    assert_eq!(service.calls(), vec!["list"]);
}

// ==========================================
// 删除
// ==========================================

#[tokio::test]
async fn test_delete_selected() {
    let (mut page, service) = loaded_page().await;
    page.table_mut().toggle_row("b1");
    page.table_mut().toggle_row("b5");
    page.table_mut().request_bulk_delete().unwrap();

    assert_eq!(page.delete_selected().await.unwrap(), 2);
    assert_eq!(table_ids(&page), vec!["b2", "b3", "b4", "b6"]);
    assert!(page.table().selected_ids().is_empty());
    assert_eq!(service.stored().len(), 4);
    assert_eq!(page.drain_notices()[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_delete_selected_failure_restores_rows_but_clears_selection() {
    let (mut page, service) = loaded_page().await;
    page.table_mut().toggle_row("b3");
    page.table_mut().request_bulk_delete().unwrap();
    service.fail_next_calls(true);

    assert!(page.delete_selected().await.is_err());
    assert_eq!(table_ids(&page).len(), 6);
    assert!(page.table().selected_ids().is_empty());
    assert_eq!(page.drain_notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_delete_selected_requires_confirmation() {
    let (mut page, service) = loaded_page().await;
    page.table_mut().toggle_row("b3");

    assert!(matches!(
        page.delete_selected().await,
        Err(ResourceError::Table(_))
    ));
    assert_eq!(service.calls(), vec!["list"]);
    assert!(page.table().is_selected("b3"));
}

#[tokio::test]
async fn test_delete_row_action() {
    let (mut page, _service) = loaded_page().await;
    assert_eq!(page.delete_row("b6").await.unwrap(), 1);
    assert!(page.table().row_by_id("b6").is_none());
    assert!(matches!(
        page.delete_row("b6").await,
        Err(ResourceError::NotFound(_))
    ));
}

// ==========================================
// 工具栏
// ==========================================

#[tokio::test]
async fn test_toolbar_buttons_emit_intents() {
    let (mut page, _service) = loaded_page().await;
    let view = page.table().view();
    assert!(view.toolbar.add_label.is_some());
    assert!(view.toolbar.import_label.is_some());

    assert!(page.table_mut().trigger_add());
    assert!(page.table_mut().trigger_import());
    assert_eq!(
        page.take_intents(),
        vec![PageIntent::OpenAddForm, PageIntent::OpenImport]
    );
    assert!(page.take_intents().is_empty());
}

// ==========================================
// 导入
// ==========================================

fn import_file() -> fleet_dashboard::UploadedFile {
    csv_upload(
        "new-buses.csv",
        &[
            "plate,seats,type",
            "hh-800-hh,45,coach",
            "II-900-II,30,minibus",
            "HH-800-HH,45,coach",
        ],
    )
}

#[tokio::test]
async fn test_import_appends_rows() {
    let (mut page, service) = loaded_page().await;
    page.open_import();
    assert_eq!(page.upload(import_file()).await.unwrap(), ImportStep::Map);
    page.wizard_mut().next().unwrap();
    assert_eq!(page.wizard().report().skipped.len(), 1);

    assert_eq!(page.confirm_import().await.unwrap(), 2);
    assert_eq!(page.rows().len(), 8);
    assert_eq!(service.stored().len(), 8);
    assert!(!page.wizard().is_open());

    let plates: Vec<String> = page.rows().iter().skip(6).map(|b| b.plate.clone()).collect();
    assert_eq!(plates, vec!["HH-800-HH", "II-900-II"]);
    assert_eq!(page.drain_notices()[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_import_failure_rolls_back() {
    let (mut page, service) = loaded_page().await;
    page.open_import();
    page.upload(import_file()).await.unwrap();
    page.wizard_mut().next().unwrap();
    service.fail_next_calls(true);

    assert!(page.confirm_import().await.is_err());
    assert_eq!(page.rows().len(), 6);
    assert_eq!(page.table().view().source_rows, 6);
    assert_eq!(page.drain_notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_upload_error_pushes_notice() {
    let (mut page, _service) = loaded_page().await;
    page.open_import();

    assert!(page
        .upload(csv_upload("empty.csv", &["plate,seats"]))
        .await
        .is_err());
    assert_eq!(page.wizard().step(), ImportStep::Upload);
    assert_eq!(page.drain_notices()[0].level, NoticeLevel::Error);

    // 未到预览步骤时确认被拒绝
    assert!(matches!(
        page.confirm_import().await,
        Err(ResourceError::Import(_))
    ));
}
