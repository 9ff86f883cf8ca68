use mockito::{Matcher, Server};
use serde_json::json;

use osonish_notify::prelude::*;

fn dev_service() -> VerificationService {
    // Development mode never contacts the gateway, so the client can
    // point anywhere.
    let client = EskizClient::with_base_url("t@e.uz", "pw", "http://127.0.0.1:9".to_string());
    VerificationService::with_parts(
        client,
        CodeStore::new(),
        CodeTemplate::default(),
        "OsonIsh".to_string(),
        SmsMode::Development,
    )
}

#[tokio::test]
async fn test_development_flow_end_to_end() {
    let service = dev_service();

    let issued = service.send_code("+998 90 123-45-67").await.unwrap();
    assert_eq!(issued.phone, "998901234567");

    let code = match issued.delivery {
        CodeDelivery::Logged { code } => code,
        other => panic!("expected logged delivery, got {:?}", other),
    };

    assert_eq!(service.verify_code("8901234567", &code), Ok(()));
    // The code is consumed by the successful check.
    assert_eq!(
        service.verify_code("998901234567", &code),
        Err(VerifyError::NotFound)
    );
}

#[tokio::test]
async fn test_review_number_never_reaches_the_gateway() {
    let service = dev_service();

    let issued = service.send_code("+998 99 999-99-99").await.unwrap();
    assert!(matches!(issued.delivery, CodeDelivery::FixedTestCode));
    assert_eq!(service.verify_code("998999999999", TEST_CODE), Ok(()));
}

#[tokio::test]
async fn test_cooldown_binds_all_input_forms_of_a_number() {
    let service = dev_service();
    service.send_code("+998 90 123-45-67").await.unwrap();

    // Different spelling, same number.
    let err = service.send_code("901234567").await.unwrap_err();
    assert!(matches!(
        err,
        CodeFlowError::Verify(VerifyError::CooldownActive { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_sends_for_distinct_numbers() {
    use futures::future;

    let service = dev_service();

    let futures = (0..10).map(|i| {
        let service = &service;
        let phone = format!("99890000000{}", i);
        async move { service.send_code(&phone).await }
    });

    let results = future::join_all(futures).await;

    assert_eq!(results.len(), 10);
    for result in results {
        let issued = result.unwrap();
        assert!(matches!(issued.delivery, CodeDelivery::Logged { .. }));
    }
}

#[tokio::test]
async fn test_production_flow_sends_rendered_template() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(
            json!({"message": "token_generated", "data": {"token": "tok-1"}}).to_string(),
        )
        .create_async()
        .await;
    let send = server
        .mock("POST", "/message/sms/send")
        .match_header("authorization", "Bearer tok-1")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""mobile_phone":"998901234567""#.to_string()),
            Matcher::Regex(r#""message":"\d{6} - Код подтверждения"#.to_string()),
            Matcher::Regex(r#""from":"OsonIsh""#.to_string()),
        ]))
        .with_status(200)
        .with_body(json!({"id": "4385062", "status": "waiting"}).to_string())
        .create_async()
        .await;

    let client = EskizClient::with_base_url("ops@osonish.uz", "secret", server.url());
    let service = VerificationService::with_parts(
        client,
        CodeStore::new(),
        CodeTemplate::default(),
        "OsonIsh".to_string(),
        SmsMode::Production,
    );

    let issued = service.send_code("+998 90 123-45-67").await.unwrap();
    match issued.delivery {
        CodeDelivery::Sms { message_id } => assert_eq!(message_id, "4385062"),
        other => panic!("expected sms delivery, got {:?}", other),
    }

    // A delivered code is checkable; a wrong guess burns an attempt.
    assert_eq!(
        service.verify_code("998901234567", "000000"),
        Err(VerifyError::WrongCode { remaining: 2 })
    );
    send.assert_async().await;
}

#[tokio::test]
async fn test_rejected_send_leaves_no_checkable_code() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(
            json!({"message": "token_generated", "data": {"token": "tok-1"}}).to_string(),
        )
        .create_async()
        .await;
    server
        .mock("POST", "/message/sms/send")
        .with_status(400)
        .with_body(json!({"message": "текст не согласован"}).to_string())
        .create_async()
        .await;

    let client = EskizClient::with_base_url("ops@osonish.uz", "secret", server.url());
    let service = VerificationService::with_parts(
        client,
        CodeStore::new(),
        CodeTemplate::default(),
        "OsonIsh".to_string(),
        SmsMode::Production,
    );

    let err = service.send_code("998901234567").await.unwrap_err();
    assert!(matches!(err, CodeFlowError::Sms(SmsError::Provider(_))));

    // Nothing was stored for the failed send.
    assert_eq!(
        service.verify_code("998901234567", "123456"),
        Err(VerifyError::NotFound)
    );

    // And no cooldown blocks the retry once the gateway recovers.
    server
        .mock("POST", "/message/sms/send")
        .with_status(200)
        .with_body(json!({"id": "4385063", "status": "waiting"}).to_string())
        .create_async()
        .await;
    let issued = service.send_code("998901234567").await.unwrap();
    assert!(matches!(issued.delivery, CodeDelivery::Sms { .. }));
}
