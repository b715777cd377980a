use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Default)]
struct RecordingDelivery {
    sent: Mutex<Vec<(String, String, OtpPurpose)>>,
}

impl RecordingDelivery {
    fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, code, _)| code.clone())
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl CodeDelivery for RecordingDelivery {
    fn deliver(
        &self,
        destination: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), code.to_string(), purpose));
        Ok(())
    }
}

struct FailingDelivery;

impl CodeDelivery for FailingDelivery {
    fn deliver(&self, _: &str, _: &str, _: OtpPurpose) -> Result<(), DeliveryError> {
        Err(DeliveryError("sms gateway unreachable".to_string()))
    }
}

fn engine_with_recorder() -> (OtpEngine, Arc<RecordingDelivery>) {
    let delivery = Arc::new(RecordingDelivery::default());
    (OtpEngine::new(delivery.clone()), delivery)
}

#[test]
fn generated_codes_are_six_digits() {
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..1000 {
        let code = generate_code(&mut rng);
        assert_eq!(code.len(), 6);
        let value: u32 = code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
    }
}

#[test]
fn generated_codes_are_deterministic_per_seed() {
    let a = generate_code(&mut StdRng::seed_from_u64(7));
    let b = generate_code(&mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);
}

#[tokio::test]
async fn request_issues_and_delivers_a_code() {
    let (engine, delivery) = engine_with_recorder();
    engine
        .request("+10000000001", OtpPurpose::Delete)
        .unwrap();

    assert_eq!(engine.phase(), OtpPhase::Sent);
    assert_eq!(engine.purpose(), Some(OtpPurpose::Delete));
    assert_eq!(engine.remaining_secs(), CODE_TTL_SECS);
    assert!(!engine.can_resend());

    let sent = delivery.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (destination, code, purpose) = &sent[0];
    assert_eq!(destination, "+10000000001");
    assert_eq!(code.len(), 6);
    assert_eq!(*purpose, OtpPurpose::Delete);
}

#[tokio::test]
async fn verify_consumes_the_code() {
    let (engine, delivery) = engine_with_recorder();
    engine.request("dest", OtpPurpose::Login).unwrap();
    let code = delivery.last_code().unwrap();

    engine.verify(&code).unwrap();
    assert_eq!(engine.phase(), OtpPhase::Verified);
    assert!(engine.can_resend());

    // The code is single-use.
    assert_eq!(engine.verify(&code), Err(OtpError::NotPending));
}

#[tokio::test]
async fn mismatch_leaves_the_code_live() {
    let (engine, delivery) = engine_with_recorder();
    engine.request("dest", OtpPurpose::Delete).unwrap();
    let code = delivery.last_code().unwrap();

    assert_eq!(engine.verify("000000"), Err(OtpError::CodeMismatch));
    assert_eq!(engine.phase(), OtpPhase::Sent);

    engine.verify(&code).unwrap();
    assert_eq!(engine.phase(), OtpPhase::Verified);
}

#[tokio::test]
async fn candidate_whitespace_is_ignored() {
    let (engine, delivery) = engine_with_recorder();
    engine.request("dest", OtpPurpose::Delete).unwrap();
    let code = delivery.last_code().unwrap();
    engine.verify(&format!("  {code} ")).unwrap();
}

#[tokio::test]
async fn verify_without_request_is_rejected() {
    let (engine, _) = engine_with_recorder();
    assert_eq!(engine.verify("123456"), Err(OtpError::NotPending));
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_once_per_second() {
    let (engine, _) = engine_with_recorder();
    engine.request("dest", OtpPurpose::Delete).unwrap();

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(engine.remaining_secs(), CODE_TTL_SECS - 5);
    assert_eq!(engine.phase(), OtpPhase::Sent);
    assert!(!engine.can_resend());
}

#[tokio::test(start_paused = true)]
async fn code_expires_after_the_ttl() {
    let (engine, delivery) = engine_with_recorder();
    engine.request("dest", OtpPurpose::Delete).unwrap();
    let code = delivery.last_code().unwrap();

    tokio::time::sleep(Duration::from_millis(CODE_TTL_SECS * 1000 + 500)).await;
    assert_eq!(engine.phase(), OtpPhase::Expired);
    assert_eq!(engine.remaining_secs(), 0);
    assert!(engine.can_resend());
    assert_eq!(engine.verify(&code), Err(OtpError::Expired));
}

#[tokio::test(start_paused = true)]
async fn new_request_invalidates_the_previous_code() {
    let (engine, delivery) = engine_with_recorder();
    engine
        .request_with_rng("dest", OtpPurpose::Delete, &mut StdRng::seed_from_u64(1))
        .unwrap();
    let old_code = delivery.last_code().unwrap();

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    engine
        .request_with_rng("dest", OtpPurpose::Delete, &mut StdRng::seed_from_u64(2))
        .unwrap();
    let new_code = delivery.last_code().unwrap();
    assert_ne!(old_code, new_code);
    assert_eq!(delivery.count(), 2);
    // The countdown restarts for the replacement code.
    assert_eq!(engine.remaining_secs(), CODE_TTL_SECS);

    assert_eq!(engine.verify(&old_code), Err(OtpError::CodeMismatch));
    engine.verify(&new_code).unwrap();
}

#[tokio::test(start_paused = true)]
async fn expired_code_can_be_resent() {
    let (engine, delivery) = engine_with_recorder();
    engine.request("dest", OtpPurpose::Delete).unwrap();
    tokio::time::sleep(Duration::from_millis(CODE_TTL_SECS * 1000 + 500)).await;
    assert!(engine.can_resend());

    engine.request("dest", OtpPurpose::Delete).unwrap();
    assert_eq!(engine.phase(), OtpPhase::Sent);
    assert_eq!(engine.remaining_secs(), CODE_TTL_SECS);
    let code = delivery.last_code().unwrap();
    engine.verify(&code).unwrap();
}

#[tokio::test]
async fn delivery_failure_keeps_the_code_live() {
    let engine = OtpEngine::new(Arc::new(FailingDelivery));
    let err = engine
        .request_with_rng("dest", OtpPurpose::Delete, &mut StdRng::seed_from_u64(3))
        .unwrap_err();
    assert!(matches!(err, OtpError::Delivery(_)));

    // The code was generated before delivery was attempted, so the
    // lifecycle is unaffected and a verify still succeeds.
    assert_eq!(engine.phase(), OtpPhase::Sent);
    assert_eq!(engine.remaining_secs(), CODE_TTL_SECS);
    let expected = generate_code(&mut StdRng::seed_from_u64(3));
    engine.verify(&expected).unwrap();
}
