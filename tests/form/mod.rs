use std::sync::Arc;

use parking_lot::Mutex;
use rstest::rstest;
use serde_json::{json, Value};

use recordform::backend::{RECORD_CREATE, ROWS_GET};
use recordform::fields::{Control, FieldKind, UserInput};
use recordform::form::view::{FieldView, Footer, FormLayout};
use recordform::form::{FormError, FormMode, RecordForm, RecordFormProps, SubmitOutcome};
use recordform::schema::DropdownOption;

use crate::fixtures::{crm, record, Crm};

async fn loaded(crm: &Crm, props: RecordFormProps) -> RecordForm {
    let mut form = RecordForm::new(crm.ctx.clone(), props);
    form.load().await.unwrap();
    form
}

fn layout(form: &RecordForm) -> FormLayout {
    form.render().layout().cloned().unwrap()
}

fn field(form: &RecordForm, column_id: &str) -> FieldView {
    layout(form).field(column_id).cloned().unwrap()
}

fn created_payload(crm: &Crm) -> Value {
    crm.backend
        .requests()
        .into_iter()
        .filter(|r| r.method_name == RECORD_CREATE)
        .last()
        .map(|r| r.args["data"].clone())
        .unwrap()
}

#[rstest]
#[tokio::test]
async fn test_create_mode_fields(crm: Crm) {
    let form = loaded(&crm, RecordFormProps::create("crm", "contact")).await;

    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(
        layout(&form).column_ids(),
        vec!["firstName", "accountId", "regionId", "active", "nextCall", "score", "referrer"]
    );
    assert_eq!(layout(&form).header, None);
    assert_eq!(layout(&form).footer, Footer::CreateCancel);
}

#[rstest]
#[tokio::test]
async fn test_edit_mode_fields(crm: Crm) {
    let form = loaded(&crm, RecordFormProps::edit("crm", "contact", json!(1))).await;

    let layout = layout(&form);
    assert_eq!(
        layout.column_ids(),
        vec!["firstName", "accountId", "regionId", "active", "nextCall", "createdAt", "score"]
    );
    assert_eq!(layout.header.as_deref(), Some("Update Contacts"));
    let Footer::Actions(actions) = layout.footer else {
        panic!("Expected action buttons");
    };
    assert_eq!(
        actions.iter().map(|a| a.id.clone()).collect::<Vec<_>>(),
        vec![json!("call"), json!("archive")]
    );
}

#[rstest]
#[case::create(RecordFormProps::create("crm", "contact"))]
#[case::edit(RecordFormProps::edit("crm", "contact", json!(2)))]
#[tokio::test]
async fn test_hidden_column_never_rendered(crm: Crm, #[case] props: RecordFormProps) {
    let form = loaded(&crm, props).await;
    assert!(layout(&form).field("notes").is_none());
    assert!(layout(&form).field("id").is_none());
}

#[rstest]
#[tokio::test]
async fn test_where_prefill_is_submitted(crm: Crm) {
    let props = RecordFormProps::create("crm", "contact")
        .with_where(vec![record(json!({"accountId": 5}))]);
    let mut form = loaded(&crm, props).await;

    assert!(layout(&form).field("accountId").is_none());
    form.submit().await.unwrap();

    assert_eq!(created_payload(&crm)["accountId"], json!(5));
}

#[rstest]
#[case::bool_true(1)]
#[case::number_one(2)]
#[case::string_one(3)]
#[tokio::test]
async fn test_truthy_values_render_checked(crm: Crm, #[case] id: i64) {
    let form = loaded(&crm, RecordFormProps::edit("crm", "contact", json!(id))).await;

    let active = field(&form, "active");
    assert_eq!(active.kind, FieldKind::Boolean);
    assert_eq!(active.control, Control::Checkbox { checked: true });
}

#[rstest]
#[tokio::test]
async fn test_checkbox_reports_one_and_zero(crm: Crm) {
    let mut form = loaded(&crm, RecordFormProps::edit("crm", "contact", json!(4))).await;
    assert_eq!(
        field(&form, "active").control,
        Control::Checkbox { checked: false }
    );

    form.input("active", UserInput::Check(true)).await.unwrap();
    assert_eq!(form.value("active"), json!(1));
    form.input("active", UserInput::Check(false)).await.unwrap();
    assert_eq!(form.value("active"), json!(0));
}

#[rstest]
#[tokio::test]
async fn test_empty_reference_only_offers_none(crm: Crm) {
    let mut form = loaded(&crm, RecordFormProps::create("crm", "contact")).await;

    let Control::Select(select) = field(&form, "regionId").control else {
        panic!("Expected a select");
    };
    assert_eq!(select.options, vec![DropdownOption::none()]);
    assert_eq!(select.placeholder, "label");
    assert!(select.create_related.is_none());

    form.handle_change("regionId", json!(3)).unwrap();
    form.input("regionId", UserInput::Choose("null".to_string()))
        .await
        .unwrap();
    assert_eq!(form.value("regionId"), Value::Null);
}

#[rstest]
#[tokio::test]
async fn test_reference_options_and_related_links(crm: Crm) {
    let mut form = loaded(&crm, RecordFormProps::edit("crm", "contact", json!(1))).await;

    let Control::Select(select) = field(&form, "accountId").control else {
        panic!("Expected a select");
    };
    assert_eq!(
        select.options.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
        vec!["Acme", "Initech", "None"]
    );
    assert_eq!(select.selected.as_deref(), Some("1"));
    assert_eq!(select.view_related.unwrap().to_string(), "/crm/account/1");
    assert!(select.create_related.is_some());

    // Picking another account re-runs the option query with the new value
    let fetches = crm.backend.calls_to(ROWS_GET);
    form.input("accountId", UserInput::Choose("2".to_string()))
        .await
        .unwrap();
    assert_eq!(form.value("accountId"), json!(2));
    assert_eq!(crm.backend.calls_to(ROWS_GET), fetches + 1);
    let last = crm.backend.requests().pop().unwrap();
    assert_eq!(last.args["queryModifierArgs"]["value"], json!(2));
}

#[rstest]
#[tokio::test]
async fn test_read_only_fields(crm: Crm) {
    let form = loaded(&crm, RecordFormProps::edit("crm", "contact", json!(1))).await;

    assert_eq!(field(&form, "score").control, Control::Static("7".to_string()));
    let created = field(&form, "createdAt");
    assert_eq!(created.kind, FieldKind::ReadOnly);
    assert_eq!(
        created.control,
        Control::Static("06/01/2023 09:00:00 AM".to_string())
    );
}

#[rstest]
#[tokio::test]
async fn test_close_on_create(crm: Crm) {
    let calls = Arc::new(Mutex::new(vec![]));
    let on_close = {
        let calls = calls.clone();
        Box::new(move |id: Option<Value>| calls.lock().push(id))
    };
    let mut form = RecordForm::new(
        crm.ctx.clone(),
        RecordFormProps::create("crm", "contact").close_on_create(true),
    )
    .with_on_close(on_close);
    form.load().await.unwrap();
    form.input("firstName", UserInput::Text("Alan".to_string()))
        .await
        .unwrap();

    assert_eq!(
        form.submit().await.unwrap(),
        SubmitOutcome::Closed(json!(5))
    );
    assert_eq!(*calls.lock(), vec![Some(json!(5))]);
    assert!(crm.navigator.history().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_navigate_after_create(crm: Crm) {
    let calls = Arc::new(Mutex::new(vec![]));
    let on_close = {
        let (calls, navigator) = (calls.clone(), crm.navigator.clone());
        Box::new(move |id: Option<Value>| calls.lock().push((id, navigator.last())))
    };
    let mut form = RecordForm::new(crm.ctx.clone(), RecordFormProps::create("crm", "contact"))
        .with_on_close(on_close);
    form.load().await.unwrap();

    let outcome = form.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Navigated("/crm/contact/5".parse().unwrap()));
    assert_eq!(
        crm.navigator.last().map(|p| p.to_string()).as_deref(),
        Some("/crm/contact/5")
    );
    // on_close ran before the navigation
    assert_eq!(*calls.lock(), vec![(Some(json!(5)), None)]);
}

#[rstest]
#[tokio::test]
async fn test_second_submit_creates_nothing(crm: Crm) {
    let mut form = loaded(&crm, RecordFormProps::create("crm", "account")).await;
    form.handle_change("company", json!("Globex")).unwrap();

    form.submit().await.unwrap();
    assert!(matches!(form.submit().await, Err(FormError::Closed)));
    form.cancel();
    assert!(matches!(form.submit().await, Err(FormError::Closed)));

    assert_eq!(crm.backend.calls_to(RECORD_CREATE), 1);
    assert_eq!(crm.backend.rows("crm", "account").len(), 3);
    assert_eq!(crm.navigator.history().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_datetime_round_trip(crm: Crm) {
    let existing = loaded(&crm, RecordFormProps::edit("crm", "contact", json!(1))).await;
    let displayed = existing.value("nextCall");
    assert_eq!(displayed, json!("01/31/2024 01:45:00 PM"));
    assert_eq!(
        field(&existing, "nextCall").control,
        Control::DateTimeInput {
            value: "01/31/2024 01:45:00 PM".to_string()
        }
    );

    let mut form = loaded(&crm, RecordFormProps::create("crm", "contact")).await;
    form.input(
        "nextCall",
        UserInput::Text(displayed.as_str().unwrap().to_string()),
    )
    .await
    .unwrap();
    form.submit().await.unwrap();

    assert_eq!(created_payload(&crm)["nextCall"], json!("2024-01-31 13:45:00"));
}

#[rstest]
#[tokio::test]
async fn test_blank_datetime_is_submitted_as_null(crm: Crm) {
    let mut form = loaded(&crm, RecordFormProps::create("crm", "contact")).await;
    form.input("nextCall", UserInput::Text("   ".to_string()))
        .await
        .unwrap();
    form.submit().await.unwrap();

    assert_eq!(created_payload(&crm)["nextCall"], Value::Null);
}

#[rstest]
#[tokio::test]
async fn test_failed_option_fetch_degrades_to_empty_select(crm: Crm) {
    crm.backend.set_unreachable("crm", "account", true);
    let form = loaded(&crm, RecordFormProps::create("crm", "contact")).await;

    let Control::Select(select) = field(&form, "accountId").control else {
        panic!("Expected a select");
    };
    assert!(select.options.is_empty());
}
