//! Tests for #[derive(Action)]

use binaan_dispatch::{Action, ActionCategory, Phase, RequestId, SharedStore};

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
enum ReportAction {
    ListFetch(RequestId),
    ListDidLoad(RequestId, Vec<u32>),
    ListDidError(RequestId, String),
    SemesterOptionsFetch { request: RequestId },
    SemesterOptionsDidLoad { request: RequestId, values: Vec<String> },
    FiltersSet(i32),
    CardToggle(u32),
    #[action(phase = "fulfilled", category = "list")]
    ListRestore,
    #[action(skip_category)]
    DetailClear,
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
enum AppAction {
    #[action(forward)]
    Report(ReportAction),
    SessionReset,
}

#[test]
fn test_names() {
    let id = RequestId::new(1);
    assert_eq!(ReportAction::ListFetch(id).name(), "ListFetch");
    assert_eq!(
        ReportAction::SemesterOptionsFetch { request: id }.name(),
        "SemesterOptionsFetch"
    );
    assert_eq!(ReportAction::ListRestore.name(), "ListRestore");
}

#[test]
fn test_inferred_phases() {
    let id = RequestId::new(1);
    assert_eq!(ReportAction::ListFetch(id).phase(), Some(Phase::Pending));
    assert_eq!(
        ReportAction::ListDidLoad(id, vec![]).phase(),
        Some(Phase::Fulfilled)
    );
    assert_eq!(
        ReportAction::ListDidError(id, "x".into()).phase(),
        Some(Phase::Rejected)
    );
    assert_eq!(ReportAction::FiltersSet(2024).phase(), None);
}

#[test]
fn test_explicit_phase_override() {
    assert_eq!(ReportAction::ListRestore.phase(), Some(Phase::Fulfilled));
}

#[test]
fn test_categories() {
    let id = RequestId::new(1);
    assert_eq!(ReportAction::ListFetch(id).category(), Some("list"));
    assert_eq!(ReportAction::ListRestore.category(), Some("list"));
    assert_eq!(
        ReportAction::SemesterOptionsDidLoad {
            request: id,
            values: vec![]
        }
        .category(),
        Some("semester_options")
    );
    assert_eq!(ReportAction::FiltersSet(1).category(), Some("filters"));
    assert_eq!(ReportAction::CardToggle(3).category(), Some("card"));
    assert_eq!(ReportAction::DetailClear.category(), None);

    assert!(ReportAction::ListDidError(id, String::new()).is_list());
    assert!(!ReportAction::CardToggle(1).is_list());
    assert_eq!(
        ReportAction::DetailClear.category_enum(),
        ReportActionCategory::Uncategorized
    );
    assert_eq!(ReportActionCategory::List.name(), "list");
    assert!(ReportActionCategory::all().contains(&ReportActionCategory::SemesterOptions));
}

#[test]
fn test_forwarded_variant_delegates() {
    let id = RequestId::new(9);
    let action = AppAction::Report(ReportAction::ListDidError(id, "boom".into()));

    assert_eq!(action.name(), "ListDidError");
    assert_eq!(action.phase(), Some(Phase::Rejected));
    assert_eq!(action.category(), Some("report"));
    assert_eq!(ActionCategory::category_enum(&action), AppActionCategory::Report);

    assert_eq!(AppAction::SessionReset.name(), "SessionReset");
    assert_eq!(AppAction::SessionReset.category(), Some("session"));
    assert_eq!(AppAction::SessionReset.phase(), None);
}

fn reducer(years: &mut Vec<i32>, action: AppAction) -> bool {
    match action {
        AppAction::Report(ReportAction::FiltersSet(year)) => {
            years.push(year);
            true
        }
        AppAction::SessionReset => {
            years.clear();
            true
        }
        _ => false,
    }
}

#[tokio::test]
async fn test_derived_actions_drive_a_shared_store() {
    let store = SharedStore::new(Vec::new(), reducer);
    store.dispatch(AppAction::Report(ReportAction::FiltersSet(2023)));
    store.dispatch(AppAction::Report(ReportAction::CardToggle(1)));

    assert_eq!(store.snapshot(), vec![2023]);
    assert_eq!(store.version(), 1);
}
