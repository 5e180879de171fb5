//! End-to-end workflows through `AppContext` against a mock backend

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dermascan::appointments::ExpirySweep;
use dermascan::error::{user_message, DermascanError, ErrorCategory};
use dermascan::session::Role;
use dermascan::storage::{keys, KeyValueStore, SledStore};
use dermascan::validation::{BookingForm, LoginForm, SignupForm};
use dermascan::AppContext;

mod common;

async fn mount_upload(server: &MockServer, label: &str, id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "diagnosis": {"result": label, "_id": id}
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_establishes_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T1",
            "user": {"id": "U1", "role": "patient", "fullName": "Jane"}
        })))
        .mount(&server)
        .await;

    let (ctx, store) = common::context_for(&server);
    ctx.login(&LoginForm {
        email: "a@b.com".into(),
        password: "secret1".into(),
    })
    .await
    .unwrap();

    let session = ctx.sessions().current().await.unwrap().unwrap();
    assert_eq!(session.auth_token, "T1");
    assert_eq!(session.user_id, "U1");
    assert_eq!(session.role, Role::Patient);
    assert_eq!(session.display_name, "Jane");
    assert_eq!(session.email.as_deref(), Some("a@b.com"));
    assert_eq!(store.get(keys::TOKEN).await.unwrap().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_doctor_login_uses_doctor_token_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "DT",
            "user": {"_id": "DOC1", "role": "doctor", "fullName": "Dr. House", "isApproved": false}
        })))
        .mount(&server)
        .await;

    let (ctx, store) = common::context_for(&server);
    let session = ctx
        .login(&LoginForm {
            email: "house@clinic.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();

    assert!(session.is_pending_doctor());
    assert_eq!(store.get(keys::DOCTOR_TOKEN).await.unwrap().as_deref(), Some("DT"));
    assert!(store.get(keys::TOKEN).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::patient()).await.unwrap();

    let err = ctx
        .login(&LoginForm {
            email: "a@b.com".into(),
            password: "wrong-password".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(user_message(&err), "Invalid credentials");
    assert_eq!(
        ctx.sessions().current().await.unwrap(),
        Some(common::patient())
    );
}

#[tokio::test]
async fn test_signup_validation_happens_before_network() {
    let server = MockServer::start().await;
    let (ctx, _) = common::context_for(&server);

    let err = ctx
        .signup(&SignupForm {
            full_name: "Jane".into(),
            email: "a@b.com".into(),
            password: "secret1".into(),
            mobile_number: "123".into(),
            birth_date: "1990-01-01".into(),
            role: Role::Patient,
        })
        .await
        .unwrap_err();

    assert_eq!(ErrorCategory::of(&err), ErrorCategory::Validation);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_uses_entered_name_when_response_has_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_partial_json(json!({"mobilenumber": "0123456789", "role": "patient"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "T2",
            "user": {"_id": "U2", "role": "patient", "patientUserId": "P2"}
        })))
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    let session = ctx
        .signup(&SignupForm {
            full_name: "Jane Doe".into(),
            email: "jane@b.com".into(),
            password: "secret1".into(),
            mobile_number: "0123456789".into(),
            birth_date: "1990-01-01".into(),
            role: Role::Patient,
        })
        .await
        .unwrap();

    assert_eq!(session.display_name, "Jane Doe");
    assert_eq!(session.patient_id.as_deref(), Some("P2"));
    assert_eq!(session.email.as_deref(), Some("jane@b.com"));
}

#[tokio::test]
async fn test_upload_records_and_overwrites_diagnosis() {
    let server = MockServer::start().await;
    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::patient()).await.unwrap();
    let (_dir, image) = common::temp_image("skin.jpg");

    mount_upload(&server, "eczema", "D1").await;
    let first = ctx.upload_and_diagnose(&image).await.unwrap();
    assert_eq!(first.diagnosis_label, "eczema");

    let record = ctx.diagnoses().fetch("P1").await.unwrap().unwrap();
    assert_eq!(record.diagnosis_label, "eczema");
    assert_eq!(record.diagnosis_id, "D1");
    assert_eq!(record.image_reference, image.display().to_string());

    mount_upload(&server, "psoriasis", "D2").await;
    ctx.upload_and_diagnose(&image).await.unwrap();
    let record = ctx.diagnoses().fetch("P1").await.unwrap().unwrap();
    assert_eq!(record.diagnosis_id, "D2");
    assert_eq!(record.diagnosis_label, "psoriasis");
}

#[tokio::test]
async fn test_upload_without_patient_id_fails_after_upload() {
    let server = MockServer::start().await;
    mount_upload(&server, "eczema", "D1").await;

    let (ctx, store) = common::context_for(&server);
    let mut session = common::patient();
    session.patient_id = None;
    ctx.sessions().establish(&session).await.unwrap();
    let (_dir, image) = common::temp_image("skin.jpg");

    let err = ctx.upload_and_diagnose(&image).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DermascanError>(),
        Some(DermascanError::MissingPatientIdentity)
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(store.get(keys::DIAGNOSIS_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upload_error_page_is_malformed_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(502).set_body_raw("<!DOCTYPE html><html></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::patient()).await.unwrap();
    let (_dir, image) = common::temp_image("skin.jpg");

    let err = ctx.upload_and_diagnose(&image).await.unwrap_err();
    assert_eq!(ErrorCategory::of(&err), ErrorCategory::MalformedUpstream);
    assert!(user_message(&err).contains("server misconfiguration"));
    assert!(ctx.diagnoses().fetch("P1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_select_then_book_doctor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patient/doctors/D1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "doctor": common::doctor_json("D1", "Dr. Who")
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/patient/select-doctor/D1"))
        .and(body_partial_json(json!({"patientId": "U1", "diagnosisId": "D9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/patient/appointments"))
        .and(header("authorization", "Bearer T1"))
        .and(body_partial_json(json!({
            "doctorId": "D1",
            "date": "2024-05-01",
            "time": "14:30",
            "status": "pending",
            "diagnosisId": "D9"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"success": true, "appointmentId": "A7"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/patient/send-diagnosis"))
        .and(body_partial_json(json!({"doctorId": "D1", "messageText": "itchy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::patient()).await.unwrap();
    ctx.diagnoses()
        .record(Some("P1"), "skin.jpg", "eczema", "D9")
        .await
        .unwrap();

    let selected = ctx.select_doctor("D1").await.unwrap();
    assert_eq!(selected.doctor_name, "Dr. Who");
    assert_eq!(
        ctx.preferences().selected_doctor().await.unwrap(),
        Some(selected)
    );

    let outcome = ctx
        .book_appointment(&BookingForm {
            doctor_id: "D1".into(),
            date: "2024-05-01".into(),
            time: "2:30 PM".into(),
            message: " itchy ".into(),
        })
        .await
        .unwrap();
    assert_eq!(outcome.appointment_id.as_deref(), Some("A7"));
    assert_eq!(outcome.time, "14:30");
}

#[tokio::test]
async fn test_booking_without_selection_sends_nothing() {
    let server = MockServer::start().await;
    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::patient()).await.unwrap();

    let err = ctx
        .book_appointment(&BookingForm {
            doctor_id: "D1".into(),
            date: "2024-05-01".into(),
            time: "10:00".into(),
            message: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(ErrorCategory::of(&err), ErrorCategory::Validation);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confirm_appointment_then_sweep_clears() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .and(header("authorization", "Bearer DOC-TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "appointments": [
                {"_id": "A1", "patientId": "P1", "date": "2024-05-01", "time": "10:00"},
                {"_id": "A2", "patientId": "P2", "date": "2024-05-02", "time": "15:45"}
            ]
        })))
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::doctor()).await.unwrap();

    let entry = ctx.confirm_appointment("A1").await.unwrap();
    assert_eq!(entry.appointment_id, "A1");
    assert_eq!(entry.date_formatted, "May 1, 2024");

    let snapshot = ctx.confirmed_appointments().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].appointment_id, "A1");

    let notifications = ctx.confirmations().notifications("P1").await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].appointment_id, "A1");

    let mut sweep =
        ExpirySweep::with_interval(ctx.confirmations().clone(), Duration::from_millis(50));
    sweep.arm();
    assert!(sweep.wait().await.unwrap());
    assert!(ctx.confirmed_appointments().await.unwrap().is_empty());
    assert_eq!(ctx.confirmations().notifications("P1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_orphaned_appointment_keeps_list_visible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "appointments": [
                {"_id": "A1", "patientId": "P1", "date": "2024-05-01", "time": "10:00"},
                {"_id": "A2", "patientId": null, "date": "2024-05-02", "time": "15:45"}
            ]
        })))
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::doctor()).await.unwrap();

    let appointments = ctx.doctor_appointments().await.unwrap();
    assert_eq!(appointments.len(), 2);

    let err = ctx.confirm_appointment("A2").await.unwrap_err();
    assert_eq!(ErrorCategory::of(&err), ErrorCategory::Validation);
    assert!(ctx.confirmed_appointments().await.unwrap().is_empty());

    ctx.confirm_appointment("A1").await.unwrap();
    assert_eq!(ctx.confirmed_appointments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_confirm_unknown_appointment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "appointments": []})),
        )
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::doctor()).await.unwrap();
    let err = ctx.confirm_appointment("A404").await.unwrap_err();
    assert_eq!(ErrorCategory::of(&err), ErrorCategory::Validation);
    assert!(ctx.confirmed_appointments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_doctor_messages_are_filtered_to_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "messages": [
                {"_id": "M1", "from": "U1", "to": "DOC1", "messageText": "please look"},
                {"_id": "M2", "from": "U2", "to": "DOC2", "messageText": "not yours"}
            ]
        })))
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::doctor()).await.unwrap();
    let messages = ctx.doctor_messages().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message.as_deref(), Some("please look"));
}

#[tokio::test]
async fn test_create_report_and_medical_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/doctor/reports/create-report"))
        .and(body_partial_json(json!({
            "diagnosisId": "D1",
            "reportText": "Benign",
            "doctorNotes": ""
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "Report created"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/doctor/submit-medical-info"))
        .and(body_partial_json(json!({"userId": "DOC1", "contactNumber": "0123456789"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::doctor()).await.unwrap();

    let response = ctx.create_report("D1", "Benign", None).await.unwrap();
    assert_eq!(response.message.as_deref(), Some("Report created"));

    ctx.submit_medical_info(&dermascan::validation::MedicalInfoForm {
        specialization: "Dermatology".into(),
        experience: "10".into(),
        qualifications: "MD".into(),
        medical_license: "L-1".into(),
        hospital: "General".into(),
        contact_number: "0123456789".into(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_admin_clear_store_wipes_everything() {
    let server = MockServer::start().await;
    let (ctx, store) = common::context_for(&server);
    ctx.sessions().establish(&common::admin()).await.unwrap();
    store.set(keys::THEME_PREFERENCE, "dark").await.unwrap();

    ctx.clear_store().await.unwrap();
    assert!(store.is_empty().await);
    assert!(ctx.sessions().current().await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let server = MockServer::start().await;
    let (ctx, _) = common::context_for(&server);
    ctx.sessions().establish(&common::patient()).await.unwrap();

    ctx.logout().await.unwrap();
    assert!(ctx.sessions().current().await.unwrap().is_none());
    ctx.logout().await.unwrap();
    assert!(ctx.sessions().current().await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_survives_reopening_sled_store() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let config = common::config_for(&server);

    {
        let store = Arc::new(SledStore::open(dir.path().join("store")).unwrap());
        let ctx = AppContext::with_store(&config, store).unwrap();
        ctx.sessions().establish(&common::doctor()).await.unwrap();
    }

    let store = Arc::new(SledStore::open(dir.path().join("store")).unwrap());
    let ctx = AppContext::with_store(&config, store).unwrap();
    assert_eq!(
        ctx.sessions().current().await.unwrap(),
        Some(common::doctor())
    );
}
