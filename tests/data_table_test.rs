// ==========================================
// DataTable 集成测试
// ==========================================
// 测试目标: 搜索/筛选组合、分面计数、分页归零、
//           批量删除确认、选择与行 ID 稳定性
// ==========================================

mod helpers;

use anyhow::anyhow;
use fleet_dashboard::resource::{build_table, Bus, BusStatus, BusType, Resource};
use fleet_dashboard::table::{
    ColumnDescriptor, DataTable, FilterSelection, HeaderCheckState, SearchDescriptor,
    SortDirection, TableError, ALL_SENTINEL,
};
use helpers::mock_config::MockConfig;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use test_helpers::{bus, many_buses, sample_fleet};

fn fleet_table(config: &MockConfig) -> DataTable<Bus> {
    let mut table = build_table::<Bus>(config);
    table.set_data(sample_fleet());
    table
}

fn visible_ids(table: &DataTable<Bus>) -> Vec<String> {
    table.view().rows.into_iter().map(|r| r.id).collect()
}

// ==========================================
// 搜索 + 筛选组合
// ==========================================

#[test]
fn test_displayed_count_matches_search_and_filters() {
    let mut table = fleet_table(&MockConfig::default());
    let now = Instant::now();

    table
        .set_filter("bus_type", FilterSelection::value("coach"))
        .unwrap();
    table
        .set_filter("status", FilterSelection::value("active"))
        .unwrap();
    let view = table.view();
    assert_eq!(view.filtered_rows, 2); // b1, b6
    assert_eq!(view.source_rows, 6);
    assert_eq!(view.page.total_rows, 2);

    table.set_search_input("ff-600", now);
    table.flush_search();
    assert_eq!(visible_ids(&table), vec!["b6"]);

    // 与逐行判定结果一致
    let expected = sample_fleet()
        .into_iter()
        .filter(|b| b.bus_type == BusType::Coach && b.status == BusStatus::Active)
        .filter(|b| b.plate.to_lowercase().contains("ff-600"))
        .count();
    assert_eq!(table.view().filtered_rows, expected);
}

#[test]
fn test_search_matches_any_field_case_insensitive() {
    let mut table = build_table::<Bus>(&MockConfig::default());
    let mut fleet = sample_fleet();
    fleet[2].driver_name = Some("Zhang San".to_string());
    table.set_data(fleet);

    table.set_search_input("ZHANG", Instant::now());
    table.flush_search();
    assert_eq!(visible_ids(&table), vec!["b3"]);

    // 多个字段任一命中即可
    table.set_search_input("model b", Instant::now());
    table.flush_search();
    assert_eq!(table.view().filtered_rows, 6);
}

#[test]
fn test_search_is_debounced() {
    let mut table = fleet_table(&MockConfig::default());
    let start = Instant::now();

    table.set_search_input("aa-100", start);
    // 输入框立即更新，筛选尚未生效
    let view = table.view();
    assert_eq!(view.search.as_ref().map(|s| s.value.as_str()), Some("aa-100"));
    assert_eq!(view.filtered_rows, 6);

    assert!(!table.poll_search(start + Duration::from_millis(100)));
    assert_eq!(table.view().filtered_rows, 6);

    assert_eq!(
        table.search_deadline(),
        Some(start + Duration::from_millis(180))
    );
    assert!(table.poll_search(start + Duration::from_millis(180)));
    assert_eq!(visible_ids(&table), vec!["b1"]);
    assert_eq!(table.search_deadline(), None);
}

#[test]
fn test_typing_restarts_debounce() {
    let mut table = fleet_table(&MockConfig::default());
    let start = Instant::now();

    table.set_search_input("a", start);
    table.set_search_input("aa", start + Duration::from_millis(150));
    assert!(!table.poll_search(start + Duration::from_millis(200)));
    assert!(table.poll_search(start + Duration::from_millis(330)));
    assert_eq!(table.applied_search(), "aa");
}

// ==========================================
// 分面计数
// ==========================================

#[test]
fn test_facet_counts_ignore_own_selection() {
    let mut table = fleet_table(&MockConfig::default());

    let before = table.view();
    let type_facet = &before.facets[0];
    assert_eq!(type_facet.filter_id, "bus_type");
    assert_eq!(type_facet.all_count, 6);
    let counts: Vec<usize> = type_facet.options.iter().map(|o| o.count).collect();
    assert_eq!(counts, vec![2, 1, 3, 0]); // standard, minibus, coach, double_decker

    table
        .set_filter("bus_type", FilterSelection::value("coach"))
        .unwrap();
    let after = table.view();

    // 自身的计数不受自身选择影响
    assert_eq!(after.facets[0].all_count, before.facets[0].all_count);
    assert_eq!(after.facets[0].options, before.facets[0].options);

    // 其他筛选器的计数在当前车型选择下重新计算
    let status: Vec<usize> = after.facets[1].options.iter().map(|o| o.count).collect();
    assert_eq!(status, vec![2, 1, 0]); // active, maintenance, retired
    assert_eq!(after.facets[1].all_count, 3);
}

#[test]
fn test_facet_counts_respect_search() {
    let mut table = fleet_table(&MockConfig::default());
    table.set_search_input("-cc", Instant::now());
    table.flush_search();

    let view = table.view();
    assert_eq!(view.facets[0].all_count, 1);
    assert_eq!(view.facets[0].options[1].count, 1); // minibus
}

#[test]
fn test_all_sentinel_clears_filter() {
    let mut table = fleet_table(&MockConfig::default());
    table.set_filter_control_value("status", "retired").unwrap();
    assert_eq!(visible_ids(&table), vec!["b5"]);
    assert_eq!(table.view().facets[1].selection.to_control_value(), "retired");

    table.set_filter_control_value("status", ALL_SENTINEL).unwrap();
    assert_eq!(table.filter_selection("status"), Some(&FilterSelection::All));
    assert_eq!(table.view().filtered_rows, 6);
    assert_eq!(table.view().facets[1].selection.to_control_value(), ALL_SENTINEL);
}

#[test]
fn test_empty_result_has_message() {
    let mut table = fleet_table(&MockConfig::default());
    table
        .set_filter("bus_type", FilterSelection::value("double_decker"))
        .unwrap();

    let view = table.view();
    assert!(view.rows.is_empty());
    assert!(view.empty_message.is_some());
    assert_eq!(view.page.page_count, 1);
    assert!(table.view().facets[0].options[3].count == 0);
}

// ==========================================
// 分页
// ==========================================

#[test]
fn test_page_resets_on_search_and_filter_change() {
    let config = MockConfig::small_pages();
    let mut table = build_table::<Bus>(&config);
    table.set_data(many_buses(9));

    let events: Vec<Box<dyn Fn(&mut DataTable<Bus>)>> = vec![
        Box::new(|t: &mut DataTable<Bus>| {
            t.set_search_input("p-", Instant::now());
            t.flush_search();
        }),
        Box::new(|t: &mut DataTable<Bus>| {
            t.set_filter("status", FilterSelection::value("active")).unwrap();
        }),
        Box::new(|t: &mut DataTable<Bus>| {
            t.set_filter("bus_type", FilterSelection::value("standard")).unwrap();
        }),
        Box::new(|t: &mut DataTable<Bus>| {
            t.set_filter_control_value("status", ALL_SENTINEL).unwrap();
        }),
        Box::new(|t: &mut DataTable<Bus>| t.clear_filters()),
    ];

    for event in events {
        table.set_page(3);
        assert_eq!(table.pagination().page_index, 3);
        event(&mut table);
        assert_eq!(table.pagination().page_index, 0);
    }
}

#[test]
fn test_page_navigation_and_clamp() {
    let config = MockConfig::small_pages();
    let mut table = build_table::<Bus>(&config);
    table.set_data(many_buses(5));

    assert_eq!(table.page_info().page_count, 3);
    table.previous_page();
    assert_eq!(table.pagination().page_index, 0);

    table.next_page();
    table.next_page();
    table.next_page();
    assert_eq!(table.pagination().page_index, 2);
    assert!(!table.page_info().has_next);
    assert_eq!(table.view().rows.len(), 1);

    // 数据减少后收敛到最后一页
    table.set_data(many_buses(3));
    assert_eq!(table.pagination().page_index, 1);

    // 修改每页行数归零
    table.set_page_size(5).unwrap();
    assert_eq!(table.pagination().page_index, 0);
    assert_eq!(table.view().rows.len(), 3);
}

#[test]
fn test_sort_does_not_reset_page() {
    let config = MockConfig::small_pages();
    let mut table = build_table::<Bus>(&config);
    table.set_data(many_buses(6));
    table.set_page(2);

    let state = table.toggle_sort("plate").unwrap();
    assert_eq!(state.map(|s| s.direction), Some(SortDirection::Ascending));
    assert_eq!(table.pagination().page_index, 2);

    table.toggle_sort("plate").unwrap();
    assert_eq!(visible_ids(&table), vec!["id-1", "id-0"]);
}

#[test]
fn test_sort_by_typed_key() {
    let mut table = fleet_table(&MockConfig::default());
    table.set_page_size(20).unwrap();
    table.toggle_sort("seats").unwrap();

    let seats: Vec<u32> = table.filtered_rows().iter().map(|b| b.seats).collect();
    assert_eq!(seats, vec![19, 49, 55, 63, 80, 80]);

    let view = table.view();
    let header = view.columns.iter().find(|c| c.id == "seats").unwrap();
    assert_eq!(header.sort, Some(SortDirection::Ascending));

    assert!(matches!(
        table.toggle_sort("status"),
        Err(TableError::ColumnNotSortable(_))
    ));
}

// ==========================================
// 选择与批量删除
// ==========================================

#[test]
fn test_bulk_delete_round_trip() {
    let deleted: Arc<Mutex<Vec<Bus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = deleted.clone();
    let mut table = build_table::<Bus>(&MockConfig::default()).with_delete_selected(move |rows| {
        sink.lock().unwrap().extend_from_slice(rows);
        Ok(())
    });
    table.set_data(sample_fleet());

    for id in ["b4", "b1", "b3"] {
        assert!(table.toggle_row(id));
    }
    let confirmation = table.request_bulk_delete().unwrap();
    assert_eq!(confirmation.count, 3);
    assert!(table.view().pending_delete.is_some());

    let rows = table.confirm_bulk_delete().unwrap();
    let ids: HashSet<String> = rows.iter().map(|b| b.id.clone()).collect();
    let expected: HashSet<String> = ["b1", "b3", "b4"].iter().map(|s| s.to_string()).collect();
    assert_eq!(ids, expected);

    let handled: HashSet<String> = deleted.lock().unwrap().iter().map(|b| b.id.clone()).collect();
    assert_eq!(handled, expected);
    assert!(table.selected_ids().is_empty());
    assert!(table.view().pending_delete.is_none());
}

#[test]
fn test_selection_cleared_when_delete_handler_fails() {
    let mut table = build_table::<Bus>(&MockConfig::default())
        .with_delete_selected(|_rows| Err(anyhow!("backend rejected")));
    table.set_data(sample_fleet());
    table.toggle_row("b2");

    table.request_bulk_delete().unwrap();
    let result = table.confirm_bulk_delete();
    assert!(matches!(result, Err(TableError::DeleteHandlerFailed(_))));
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_bulk_delete_requires_confirmation_and_selection() {
    let mut table = fleet_table(&MockConfig::default());
    assert!(matches!(
        table.request_bulk_delete(),
        Err(TableError::EmptySelection)
    ));

    table.toggle_row("b1");
    assert!(matches!(
        table.confirm_bulk_delete(),
        Err(TableError::NoPendingConfirmation)
    ));

    table.request_bulk_delete().unwrap();
    table.cancel_bulk_delete();
    assert!(matches!(
        table.confirm_bulk_delete(),
        Err(TableError::NoPendingConfirmation)
    ));
    // 取消不影响选择
    assert_eq!(table.selected_ids(), vec!["b1"]);
}

#[test]
fn test_page_selection_header_state() {
    let config = MockConfig::small_pages();
    let mut table = build_table::<Bus>(&config);
    table.set_data(many_buses(5));

    assert_eq!(table.header_check_state(), HeaderCheckState::Unchecked);
    table.toggle_row("id-0");
    assert_eq!(table.header_check_state(), HeaderCheckState::Indeterminate);

    table.toggle_page_selection();
    assert_eq!(table.header_check_state(), HeaderCheckState::Checked);
    assert_eq!(table.selected_ids(), vec!["id-0", "id-1"]);

    table.toggle_page_selection();
    assert_eq!(table.header_check_state(), HeaderCheckState::Unchecked);
    assert!(table.selected_ids().is_empty());
}

#[test]
fn test_stale_selection_ignored_after_reload() {
    let mut table = fleet_table(&MockConfig::default());
    table.toggle_row("b1");
    table.toggle_row("b2");

    // 外部重新加载后 b2 已不存在
    let reloaded: Vec<Bus> = sample_fleet().into_iter().filter(|b| b.id != "b2").collect();
    table.set_data(reloaded);

    assert_eq!(table.selected_ids(), vec!["b1"]);
    assert!(!table.is_selected("b2"));
    assert!(!table.toggle_row("b2"));
    assert_eq!(table.view().selected_count, 1);
}

#[test]
fn test_positional_ids_are_degraded_mode() {
    let columns = vec![ColumnDescriptor::new("plate", "车牌", |b: &Bus| b.plate.clone())];
    let mut table = DataTable::new(columns, &MockConfig::default())
        .with_search(SearchDescriptor::new("搜索").field(|b: &Bus| b.plate.clone()));

    let first = bus("x", "AAA", BusType::Coach, BusStatus::Active, 10);
    let second = bus("y", "BBB", BusType::Coach, BusStatus::Active, 10);
    table.set_data(vec![first.clone(), second.clone()]);
    assert_eq!(table.row_ids(), &["0".to_string(), "1".to_string()]);

    table.toggle_row("0");
    // 顺序不变: 选择保持一致
    table.set_data(vec![first.clone(), second.clone()]);
    assert_eq!(table.selected_rows()[0].plate, "AAA");

    // 顺序变化: 同一位置 ID 指向另一行（已知限制，不会 panic）
    table.set_data(vec![second, first]);
    assert_eq!(table.selected_rows()[0].plate, "BBB");
}

// ==========================================
// 工具栏、行操作、详情
// ==========================================

#[test]
fn test_view_row_actions_and_detail() {
    let mut table = fleet_table(&MockConfig::default());
    let view = table.view();
    assert_eq!(view.rows[0].actions.len(), 2);
    assert!(view.rows[0].actions[1].destructive);
    assert_eq!(view.rows[0].cells[0], "AA-100-AA");
    assert_eq!(view.columns.len(), Bus::columns().len());

    assert_eq!(table.open_detail("b4").map(|b| b.seats), Some(80));
    assert_eq!(table.detail().map(|b| b.id.as_str()), Some("b4"));
    table.close_detail();
    assert!(table.detail().is_none());
}

#[test]
fn test_toolbar_labels_absent_without_callbacks() {
    let table = fleet_table(&MockConfig::default());
    let view = table.view();
    assert!(view.toolbar.add_label.is_none());
    assert!(view.toolbar.import_label.is_none());
    assert!(!view.toolbar.can_delete_selected);
    assert_eq!(view.toolbar.page_size_options, vec![10, 20, 50, 100]);
}

#[test]
fn test_view_serializes_to_json() {
    let table = fleet_table(&MockConfig::default());
    let json = serde_json::to_value(table.view()).unwrap();
    assert_eq!(json["filtered_rows"], 6);
    assert!(json["rows"].is_array());
}
