use std::sync::Arc;

use parking_lot::Mutex;
use rstest::rstest;
use serde_json::{json, Value};

use recordform::dialog::{CreateRecordDialog, CreateRecordProps};
use recordform::fields::{Control, UserInput};
use recordform::form::{RecordForm, RecordFormProps, SubmitOutcome};

use crate::fixtures::{crm, record, Crm};

fn recorder() -> (Arc<Mutex<Vec<Option<Value>>>>, recordform::form::OnClose) {
    let calls = Arc::new(Mutex::new(vec![]));
    let on_close = {
        let calls = calls.clone();
        Box::new(move |id: Option<Value>| calls.lock().push(id))
    };
    (calls, on_close)
}

#[rstest]
#[tokio::test]
async fn test_create_related_record_from_reference_field(crm: Crm) {
    let mut parent = RecordForm::new(crm.ctx.clone(), RecordFormProps::create("crm", "contact"));
    parent.load().await.unwrap();

    let Control::Select(select) = parent
        .render()
        .layout()
        .and_then(|l| l.field("accountId").cloned())
        .unwrap()
        .control
    else {
        panic!("Expected a select");
    };
    let create = select.create_related.unwrap();

    let (calls, on_close) = recorder();
    let mut dialog = CreateRecordDialog::new(
        crm.ctx.clone(),
        CreateRecordProps::new(&create.db, &create.table)
            .close_on_create(create.close_on_create)
            .with_header(&create.header),
    )
    .with_on_close(on_close);

    assert!(dialog.open().await.unwrap());
    assert_eq!(dialog.header(), "Create Related Record");
    dialog
        .form_mut()
        .unwrap()
        .input("company", UserInput::Text("Globex".to_string()))
        .await
        .unwrap();

    let SubmitOutcome::Closed(id) = dialog.submit().await.unwrap() else {
        panic!("Expected the dialog to close");
    };
    assert!(!dialog.is_open());
    assert_eq!(*calls.lock(), vec![Some(id.clone())]);
    assert!(crm.navigator.history().is_empty());

    parent
        .related_record_created("accountId", Some(id.clone()))
        .await
        .unwrap();
    assert_eq!(parent.value("accountId"), id);

    let Control::Select(select) = parent
        .render()
        .layout()
        .and_then(|l| l.field("accountId").cloned())
        .unwrap()
        .control
    else {
        panic!("Expected a select");
    };
    assert_eq!(select.selected.as_deref(), Some("3"));
    assert!(select.options.iter().any(|o| o.name == "Globex"));
}

#[rstest]
#[tokio::test]
async fn test_dialog_with_where_prefill(crm: Crm) {
    let (calls, on_close) = recorder();
    let mut dialog = CreateRecordDialog::new(
        crm.ctx.clone(),
        CreateRecordProps::new("crm", "contact").with_where(vec![record(json!({"accountId": 2}))]),
    )
    .with_on_close(on_close);
    dialog.open().await.unwrap();

    let fields = dialog
        .form()
        .unwrap()
        .render()
        .layout()
        .unwrap()
        .column_ids()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    assert!(!fields.contains(&"accountId".to_string()));

    // Without close_on_create the new record is opened
    let outcome = dialog.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Navigated("/crm/contact/5".parse().unwrap()));
    assert_eq!(*calls.lock(), vec![Some(json!(5))]);
    assert_eq!(crm.backend.rows("crm", "contact")[4]["accountId"], json!(2));
}

#[rstest]
#[tokio::test]
async fn test_one_close_per_flow(crm: Crm) {
    let (calls, on_close) = recorder();
    let mut dialog = CreateRecordDialog::new(crm.ctx.clone(), CreateRecordProps::new("crm", "account"))
        .with_on_close(on_close);

    dialog.open().await.unwrap();
    dialog.cancel();
    dialog.cancel();
    assert_eq!(*calls.lock(), vec![None]);

    // A new flow mounts a fresh form
    dialog.open().await.unwrap();
    dialog
        .form_mut()
        .unwrap()
        .handle_change("company", json!("Hooli"))
        .unwrap();
    dialog.submit().await.unwrap();
    assert_eq!(calls.lock().len(), 2);
    assert!(dialog.submit().await.is_err());
}
