use std::sync::Arc;

use serde_json::{json, Value};

use crate::backend::memory::MemoryBackend;
use crate::backend::BackendClient;
use crate::context::FormContext;
use crate::nav::RecordingNavigator;
use crate::schema::Record;

pub fn crm_fixture() -> Value {
    json!({
        "crm": {
            "contact": {
                "name": "Contacts",
                "schema": {
                    "id": {"primaryKey": true, "table": "contact"},
                    "firstName": {
                        "friendlyName": "First Name",
                        "helpText": "Given name",
                        "table": "contact"
                    },
                    "lastName": {"friendlyName": "Last Name", "table": "contact"},
                    "accountId": {
                        "friendlyName": "Account",
                        "table": "contact",
                        "join": "account",
                        "joinDb": "crm",
                        "friendlyColumnName": "company",
                        "referenceCreate": true
                    },
                    "active": {
                        "friendlyName": "Active",
                        "fieldType": "boolean",
                        "defaultValue": 1,
                        "table": "contact"
                    },
                    "createdAt": {
                        "friendlyName": "Created",
                        "columnType": "datetime",
                        "hiddenCreate": true,
                        "table": "contact"
                    },
                    "notes": {"hidden": true, "table": "contact"},
                    "internalCode": {"hiddenRecord": true, "table": "contact"},
                    "source": {
                        "friendlyName": "Source",
                        "hiddenUpdate": true,
                        "defaultValue": "web",
                        "table": "contact"
                    },
                    "company": {"friendlyName": "Company", "table": "account"}
                },
                "rows": [{
                    "id": 1,
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "accountId": 1,
                    "active": 1,
                    "createdAt": "2024-01-31 13:45:00",
                    "notes": "",
                    "internalCode": "X1",
                    "source": "web",
                    "company": "Acme",
                    "legacyColumn": "dropped"
                }],
                "actions": [{"id": "archive", "label": "Archive"}]
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
            }
        }
    })
}

pub fn crm_backend() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::from_fixture(crm_fixture()).unwrap())
}

pub fn crm_context(backend: Arc<MemoryBackend>) -> (FormContext, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = FormContext::new(BackendClient::new(backend), navigator.clone());
    (ctx, navigator)
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}
