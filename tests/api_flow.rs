use std::time::Duration;

use chrono::{NaiveDate, Utc};
use mhe_inspection::{
    app,
    client::{ApiClient, ClientError, DataSource, OfflineSnapshot, Session},
    config::{AnalysisMode, AppState, Config},
    db,
    models::{
        auth::{SignupPayload, UserRole},
        checklist::{ChecklistFilter, ChecklistItem, ChecklistItemPayload},
        dashboard::DashboardFilter,
        downtime::{CreateDowntimeLogPayload, DowntimeFilter},
        fleet::{DepartmentPayload, MheUnit, MheUnitPayload, UnitFilter},
        inspection::{
            AnalysisRecord, CreateInspectionReportPayload, ReportFilter, ReportItemPayload, ReportStatus,
            SubmissionPayload, SubmitInspectionPayload,
        },
        pms::{CreatePmsEntryPayload, PmsStatus, PmsTaskMasterPayload, UpdatePmsEntryPayload},
    },
    services::safety_service::FALLBACK_REASON,
};
use tempfile::TempDir;
use tokio::net::TcpListener;

const PHOTO: &str = "data:image/png;base64,iVBORw0KGgo=";

async fn spawn_server(analysis_mode: AnalysisMode) -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("mhe.db");
    let config = Config {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        jwt_secret: "integration-secret".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        analysis_mode,
        fonts_dir: dir.path().join("fonts"),
    };

    let state = AppState::new(&config).await.expect("app state");
    db::run_migrations(&state.db_pool).await.expect("migrations");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("serve");
    });

    (format!("http://{addr}"), dir)
}

// O cliente é bloqueante: o corpo do teste roda fora do runtime
async fn run_blocking<F>(body: F)
where
    F: FnOnce() + Send + 'static,
{
    tokio::task::spawn_blocking(body).await.expect("test body panicked");
}

fn signup(client: &ApiClient, username: &str, role: UserRole) -> Session {
    client
        .signup(&SignupPayload {
            username: username.to_string(),
            password: "s3cret!".to_string(),
            role: Some(role),
        })
        .expect("signup")
}

fn checklist_item(client: &ApiClient, session: &Session, part: &str, order: i64) -> ChecklistItem {
    client
        .create_checklist_item(
            session,
            &ChecklistItemPayload {
                qr_payload: None,
                part_name: part.to_string(),
                description: None,
                question: format!("Is the {part} in good condition?"),
                is_active: true,
                sort_order: order,
            },
        )
        .expect("checklist item")
}

fn unit(client: &ApiClient, session: &Session, code: &str, department_id: Option<i64>) -> MheUnit {
    client
        .create_unit(
            session,
            &MheUnitPayload {
                unit_code: code.to_string(),
                name: format!("Forklift {code}"),
                department_id,
                unit_type: Some("Forklift".to_string()),
                status: None,
            },
        )
        .expect("unit")
}

fn submission(item: &ChecklistItem, is_safe: bool) -> SubmissionPayload {
    SubmissionPayload {
        checklist_item_id: item.id,
        is_safe,
        photo: PHOTO.to_string(),
        remarks: (!is_safe).then(|| "needs repair".to_string()),
        timestamp: Some(Utc::now()),
    }
}

fn expect_status<T: std::fmt::Debug>(result: Result<T, ClientError>, status: u16) -> String {
    match result {
        Err(ClientError::Api { status: got, message }) if got == status => message,
        other => panic!("expected HTTP {status}, got {other:?}"),
    }
}

// Resposta de erro crua: (status, corpo JSON)
fn raw_error(result: Result<ureq::Response, ureq::Error>) -> (u16, serde_json::Value) {
    match result {
        Err(ureq::Error::Status(code, response)) => (code, response.into_json().expect("json error body")),
        other => panic!("expected an HTTP error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn auth_rules_and_roles_are_enforced() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base.clone());
        assert_eq!(client.health().unwrap(), "OK");

        let supervisor = signup(&client, "sup", UserRole::Supervisor);
        let operator = signup(&client, "op", UserRole::Operator);
        assert!(supervisor.is_supervisor());
        assert!(!operator.is_supervisor());

        let duplicate = client.signup(&SignupPayload {
            username: "op".into(),
            password: "another!".into(),
            role: None,
        });
        expect_status(duplicate, 409);

        expect_status(client.login("op", "wrong-password"), 401);
        let relogged = client.login("op", "s3cret!").unwrap();
        assert_eq!(client.me(&relogged).unwrap().username, "op");

        // sem token
        match ureq::get(&format!("{base}/api/departments")).call() {
            Err(ureq::Error::Status(code, _)) => assert_eq!(code, 401),
            other => panic!("expected 401, got {:?}", other.map(|r| r.status())),
        }

        let forbidden = client.create_department(
            &operator,
            &DepartmentPayload {
                name: "Stores".into(),
                description: None,
            },
        );
        expect_status(forbidden, 403);
        expect_status(client.list_users(&operator), 403);
        assert_eq!(client.list_users(&supervisor).unwrap().len(), 2);

        let short = client.signup(&SignupPayload {
            username: "x".into(),
            password: "1".into(),
            role: None,
        });
        expect_status(short, 400);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn master_data_uniqueness_and_references() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);

        let stores = DepartmentPayload {
            name: "Stores".into(),
            description: Some("Main warehouse".into()),
        };
        let department = client.create_department(&sup, &stores).unwrap();
        expect_status(client.create_department(&sup, &stores), 409);

        let listed = client.list_departments(&sup).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Stores");

        let fl1 = unit(&client, &sup, "FL-001", Some(department.id));
        let dup = client.create_unit(
            &sup,
            &MheUnitPayload {
                unit_code: "FL-001".into(),
                name: "Other".into(),
                department_id: None,
                unit_type: None,
                status: None,
            },
        );
        expect_status(dup, 409);

        let orphan = client.create_unit(
            &sup,
            &MheUnitPayload {
                unit_code: "FL-404".into(),
                name: "Ghost".into(),
                department_id: Some(9999),
                unit_type: None,
                status: None,
            },
        );
        expect_status(orphan, 400);

        expect_status(client.get_unit(&sup, 9999), 404);

        let in_department = client
            .list_units(
                &sup,
                &UnitFilter {
                    department_id: Some(department.id),
                    status: None,
                },
            )
            .unwrap();
        assert_eq!(in_department.len(), 1);
        assert_eq!(in_department[0].id, fl1.id);

        // apagar o departamento solta as unidades
        client.delete_department(&sup, department.id).unwrap();
        assert_eq!(client.get_unit(&sup, fl1.id).unwrap().department_id, None);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn guided_inspection_with_one_unsafe_item() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);
        let op = signup(&client, "op", UserRole::Operator);

        let forks = checklist_item(&client, &sup, "Forks", 1);
        let horn = checklist_item(&client, &sup, "Horn", 2);
        let brakes = checklist_item(&client, &sup, "Brakes", 3);
        let fl1 = unit(&client, &sup, "FL-001", None);

        // incompleto: falta um item
        let incomplete = client.submit_inspection(
            &op,
            &SubmitInspectionPayload {
                unit_id: fl1.id,
                inspection_date: None,
                submissions: vec![submission(&forks, true), submission(&horn, true)],
            },
        );
        let message = expect_status(incomplete, 400);
        assert!(message.contains("1 of 3"));

        // fora de ordem, com um item inseguro
        let outcome = client
            .submit_inspection(
                &op,
                &SubmitInspectionPayload {
                    unit_id: fl1.id,
                    inspection_date: NaiveDate::from_ymd_opt(2025, 3, 10),
                    submissions: vec![
                        submission(&brakes, true),
                        submission(&forks, true),
                        submission(&horn, false),
                    ],
                },
            )
            .unwrap();

        assert!(!outcome.analysis.is_safe);
        assert!(outcome.analysis.reason.contains("Horn"));
        assert_eq!(outcome.report.report.status, ReportStatus::Unsafe);
        assert_eq!(outcome.report.report.operator_username, "op");
        assert_eq!(outcome.report.report.analysis_reason.as_deref(), Some(outcome.analysis.reason.as_str()));
        assert_eq!(outcome.report.items.len(), 3);

        let stored = client.get_report(&op, outcome.report.report.id).unwrap();
        let horn_row = stored.items.iter().find(|i| i.part_name == "Horn").unwrap();
        assert!(!horn_row.is_safe);
        assert_eq!(horn_row.remarks.as_deref(), Some("needs repair"));

        // item desconhecido
        let unknown = client.submit_inspection(
            &op,
            &SubmitInspectionPayload {
                unit_id: fl1.id,
                inspection_date: None,
                submissions: vec![SubmissionPayload {
                    checklist_item_id: 4242,
                    ..submission(&forks, true)
                }],
            },
        );
        expect_status(unknown, 400);

        // operador não apaga relatórios
        expect_status(client.delete_report(&op, outcome.report.report.id), 403);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn downtime_copies_unsafe_items_and_unit_delete_cascades() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);

        let forks = checklist_item(&client, &sup, "Forks", 1);
        let chain = checklist_item(&client, &sup, "Mast chain", 2);
        let fl1 = unit(&client, &sup, "FL-001", None);
        let fl2 = unit(&client, &sup, "FL-002", None);

        let outcome = client
            .submit_inspection(
                &sup,
                &SubmitInspectionPayload {
                    unit_id: fl1.id,
                    inspection_date: None,
                    submissions: vec![submission(&forks, true), submission(&chain, false)],
                },
            )
            .unwrap();
        let report_id = outcome.report.report.id;

        // relatório de outra unidade
        let mismatch = client.create_downtime_log(
            &sup,
            &CreateDowntimeLogPayload {
                unit_id: fl2.id,
                reason: "Wrong unit".into(),
                start_time: Utc::now(),
                end_time: None,
                source_report_id: Some(report_id),
            },
        );
        expect_status(mismatch, 400);

        let backwards = client.create_downtime_log(
            &sup,
            &CreateDowntimeLogPayload {
                unit_id: fl1.id,
                reason: "Clock skew".into(),
                start_time: Utc::now(),
                end_time: Some(Utc::now() - chrono::Duration::hours(1)),
                source_report_id: None,
            },
        );
        expect_status(backwards, 400);

        let log = client
            .create_downtime_log(
                &sup,
                &CreateDowntimeLogPayload {
                    unit_id: fl1.id,
                    reason: "Mast chain worn".into(),
                    start_time: Utc::now(),
                    end_time: None,
                    source_report_id: Some(report_id),
                },
            )
            .unwrap();
        assert_eq!(log.unsafe_items.len(), 1);
        assert_eq!(log.unsafe_items[0].part_name, "Mast chain");

        let open = client
            .list_downtime_logs(
                &sup,
                &DowntimeFilter {
                    unit_id: Some(fl1.id),
                    open: Some(true),
                },
            )
            .unwrap();
        assert_eq!(open.len(), 1);

        client.delete_unit(&sup, fl1.id).unwrap();
        expect_status(client.get_report(&sup, report_id), 404);
        expect_status(client.get_downtime_log(&sup, log.log.id), 404);
        assert!(client
            .list_downtime_logs(&sup, &DowntimeFilter::default())
            .unwrap()
            .is_empty());
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_master_item_keeps_report_history() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);

        let horn = checklist_item(&client, &sup, "Horn", 1);
        let fl1 = unit(&client, &sup, "FL-001", None);
        let outcome = client
            .submit_inspection(
                &sup,
                &SubmitInspectionPayload {
                    unit_id: fl1.id,
                    inspection_date: None,
                    submissions: vec![submission(&horn, true)],
                },
            )
            .unwrap();
        assert_eq!(outcome.report.report.status, ReportStatus::Safe);

        client.delete_checklist_item(&sup, horn.id).unwrap();
        assert!(client
            .list_checklist_items(&sup, &ChecklistFilter::default())
            .unwrap()
            .is_empty());

        let stored = client.get_report(&sup, outcome.report.report.id).unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].checklist_item_id, None);
        assert_eq!(stored.items[0].part_name, "Horn");
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_counts_uninspected_units_online_and_offline() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);

        let department = client
            .create_department(
                &sup,
                &DepartmentPayload {
                    name: "Stores".into(),
                    description: None,
                },
            )
            .unwrap();
        let forks = checklist_item(&client, &sup, "Forks", 1);
        let fl1 = unit(&client, &sup, "FL-001", Some(department.id));
        unit(&client, &sup, "FL-002", Some(department.id));
        unit(&client, &sup, "FL-003", Some(department.id));

        for _ in 0..2 {
            client
                .submit_inspection(
                    &sup,
                    &SubmitInspectionPayload {
                        unit_id: fl1.id,
                        inspection_date: NaiveDate::from_ymd_opt(2025, 3, 10),
                        submissions: vec![submission(&forks, true)],
                    },
                )
                .unwrap();
        }

        let filter = DashboardFilter {
            department_id: Some(department.id),
            from: NaiveDate::from_ymd_opt(2025, 3, 1),
            to: NaiveDate::from_ymd_opt(2025, 3, 31),
        };
        let summary = client.dashboard_summary(&sup, &filter).unwrap();
        assert_eq!(summary.total_units, 3);
        assert_eq!(summary.inspected_units, 1);
        assert_eq!(summary.uninspected_units, 2);
        assert_eq!(summary.safe_units, 1);
        assert_eq!(summary.monthly.len(), 1);
        assert_eq!(summary.monthly[0].count, 2);

        let snapshot = OfflineSnapshot::fetch(&client, &sup).unwrap();
        let offline = DataSource::Offline(snapshot).dashboard(&filter).unwrap();
        assert_eq!(offline.uninspected_units, summary.uninspected_units);

        let online = DataSource::Online {
            client: client.clone(),
            session: sup.clone(),
        };
        assert!(online.is_online());
        assert_eq!(online.dashboard(&filter).unwrap().total_units, 3);

        let missing = client.dashboard_summary(
            &sup,
            &DashboardFilter {
                department_id: Some(9999),
                ..Default::default()
            },
        );
        expect_status(missing, 404);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_analysis_service_yields_fail_safe_verdict() {
    let (base, _dir) = spawn_server(AnalysisMode::Remote {
        api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        api_key: "unused".to_string(),
        model: "vision-test".to_string(),
        timeout: Duration::from_secs(2),
    })
    .await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);

        let verdict = client
            .analyze_safety(
                &sup,
                &[AnalysisRecord {
                    checklist_item_id: 1,
                    part_name: Some("Forks".into()),
                    question: None,
                    photo: PHOTO.to_string(),
                    is_safe: true,
                    timestamp: Utc::now(),
                }],
            )
            .unwrap();
        assert!(!verdict.is_safe);
        assert_eq!(verdict.reason, FALLBACK_REASON);

        let forks = checklist_item(&client, &sup, "Forks", 1);
        let fl1 = unit(&client, &sup, "FL-001", None);
        let outcome = client
            .submit_inspection(
                &sup,
                &SubmitInspectionPayload {
                    unit_id: fl1.id,
                    inspection_date: None,
                    submissions: vec![submission(&forks, true)],
                },
            )
            .unwrap();
        assert!(!outcome.analysis.is_safe);
        assert_eq!(outcome.report.report.analysis_reason.as_deref(), Some(FALLBACK_REASON));
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn pms_completion_stamps_completed_at() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);
        let fl1 = unit(&client, &sup, "FL-001", None);

        let task_payload = PmsTaskMasterPayload {
            task_name: "Hydraulic oil change".into(),
            description: None,
            frequency_days: 90,
            is_active: true,
        };
        let task = client.create_pms_task(&sup, &task_payload).unwrap();
        expect_status(client.create_pms_task(&sup, &task_payload), 409);

        let scheduled = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let entry = client
            .create_pms_entry(
                &sup,
                &CreatePmsEntryPayload {
                    task_master_id: task.id,
                    unit_id: fl1.id,
                    scheduled_date: scheduled,
                    status: None,
                    remarks: None,
                },
            )
            .unwrap();
        assert_eq!(entry.status, PmsStatus::Pending);
        assert!(entry.completed_at.is_none());

        let done = client
            .update_pms_entry(
                &sup,
                entry.id,
                &UpdatePmsEntryPayload {
                    scheduled_date: scheduled,
                    status: PmsStatus::Completed,
                    remarks: Some("Oil replaced".into()),
                },
            )
            .unwrap();
        assert_eq!(done.status, PmsStatus::Completed);
        assert!(done.completed_at.is_some());

        let bad_task = client.create_pms_entry(
            &sup,
            &CreatePmsEntryPayload {
                task_master_id: 9999,
                unit_id: fl1.id,
                scheduled_date: scheduled,
                status: None,
                remarks: None,
            },
        );
        expect_status(bad_task, 400);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn openapi_document_is_served() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let doc: serde_json::Value = ureq::get(&format!("{base}/api-docs/openapi.json"))
            .call()
            .expect("openapi")
            .into_json()
            .expect("json");
        assert!(doc["paths"]["/api/inspections"].is_object());
        assert!(doc["components"]["securitySchemes"]["api_jwt"].is_object());
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_requests_get_a_json_400() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base.clone());
        let sup = signup(&client, "sup", UserRole::Supervisor);
        let auth = sup.bearer();

        // corpo sem campo obrigatório
        let (status, body) = raw_error(
            ureq::post(&format!("{base}/api/departments"))
                .set("Authorization", &auth)
                .set("Content-Type", "application/json")
                .send_string("{}"),
        );
        assert_eq!(status, 400);
        assert!(body["message"].as_str().is_some_and(|m| m.contains("name")));

        // valor de enum desconhecido na query
        let (status, body) = raw_error(
            ureq::get(&format!("{base}/api/mhe-units?status=bogus"))
                .set("Authorization", &auth)
                .call(),
        );
        assert_eq!(status, 400);
        assert!(body["message"].is_string());

        // id que não é número
        let (status, body) = raw_error(
            ureq::get(&format!("{base}/api/mhe-units/abc"))
                .set("Authorization", &auth)
                .call(),
        );
        assert_eq!(status, 400);
        assert!(body["message"].is_string());

        assert!(client.list_departments(&sup).unwrap().is_empty());
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn report_with_unknown_checklist_item_is_rejected() {
    let (base, _dir) = spawn_server(AnalysisMode::Local).await;
    run_blocking(move || {
        let client = ApiClient::new(base);
        let sup = signup(&client, "sup", UserRole::Supervisor);
        let fl1 = unit(&client, &sup, "FL-001", None);

        let payload = CreateInspectionReportPayload {
            unit_id: fl1.id,
            inspection_date: None,
            items: vec![ReportItemPayload {
                checklist_item_id: Some(9999),
                part_name: "Forks".into(),
                question: "Are the forks free of cracks?".into(),
                is_safe: true,
                photo: PHOTO.to_string(),
                inspected_at: None,
                remarks: None,
            }],
        };
        expect_status(client.create_report(&sup, &payload), 400);

        // a transação desfaz o cabeçalho já inserido
        let reports = client.list_reports(&sup, &ReportFilter::default()).unwrap();
        assert!(reports.is_empty());
    })
    .await;
}
