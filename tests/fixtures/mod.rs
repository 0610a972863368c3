use std::sync::Arc;

use rstest::fixture;
use serde_json::{json, Value};

use recordform::backend::memory::MemoryBackend;
use recordform::backend::BackendClient;
use recordform::context::FormContext;
use recordform::nav::RecordingNavigator;
use recordform::schema::Record;

pub struct Crm {
    pub backend: Arc<MemoryBackend>,
    pub navigator: Arc<RecordingNavigator>,
    pub ctx: FormContext,
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

pub fn crm_tables() -> Value {
    json!({
        "crm": {
            "contact": {
                "name": "Contacts",
                "schema": {
                    "id": {"primaryKey": true, "table": "contact"},
                    "firstName": {"friendlyName": "First Name", "table": "contact"},
                    "accountId": {
                        "friendlyName": "Account",
                        "table": "contact",
                        "join": "account",
                        "joinDb": "crm",
                        "friendlyColumnName": "company",
                        "referenceCreate": true
                    },
                    "regionId": {
                        "friendlyName": "Region",
                        "table": "contact",
                        "join": "region",
                        "joinDb": "crm",
                        "friendlyColumnName": "label"
                    },
                    "active": {"friendlyName": "Active", "fieldType": "boolean", "table": "contact"},
                    "nextCall": {
                        "friendlyName": "Next call",
                        "columnType": "datetime",
                        "table": "contact"
                    },
                    "createdAt": {
                        "friendlyName": "Created",
                        "columnType": "datetime",
                        "readOnly": true,
                        "hiddenCreate": true,
                        "table": "contact"
                    },
                    "score": {"friendlyName": "Score", "readOnly": true, "table": "contact"},
                    "notes": {"hidden": true, "table": "contact"},
                    "referrer": {"friendlyName": "Referrer", "hiddenUpdate": true, "table": "contact"}
                },
                "rows": [
                    {"id": 1, "firstName": "Ada", "accountId": 1, "active": true,
                     "nextCall": "2024-01-31 13:45:00", "createdAt": "2023-06-01 09:00:00", "score": 7},
                    {"id": 2, "firstName": "Grace", "accountId": 2, "active": 1,
                     "nextCall": null, "createdAt": "2023-06-02 09:00:00", "score": 3},
                    {"id": 3, "firstName": "Edsger", "accountId": null, "active": "1",
                     "nextCall": "", "createdAt": "2023-06-03 09:00:00", "score": 9},
                    {"id": 4, "firstName": "Barbara", "accountId": 1, "active": 0,
                     "nextCall": null, "createdAt": "2023-06-04 09:00:00", "score": 1}
                ],
                "actions": [
                    {"id": "call", "label": "Log call"},
                    {"id": "archive", "label": "Archive"}
                ]
            },
            "account": {
                "name": "Accounts",
                "schema": {
                    "id": {"primaryKey": true, "table": "account"},
                    "company": {"friendlyName": "Company", "table": "account"}
                },
                "rows": [
                    {"id": 1, "company": "Acme"},
                    {"id": 2, "company": "Initech"}
                ]
            },
            "region": {
                "name": "Regions",
                "schema": {
                    "id": {"primaryKey": true, "table": "region"},
                    "label": {"friendlyName": "Label", "table": "region"}
                },
                "rows": []
            }
        }
    })
}

#[fixture]
pub fn crm() -> Crm {
    let backend = Arc::new(MemoryBackend::from_fixture(crm_tables()).unwrap());
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = FormContext::new(BackendClient::new(backend.clone()), navigator.clone());

    Crm {
        backend,
        navigator,
        ctx,
    }
}
