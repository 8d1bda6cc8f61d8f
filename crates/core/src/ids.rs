use rand::Rng;

/// Request ids have the form `req-<millisecond timestamp>-<4-digit suffix>`.
/// The suffix is random, not unique; callers that need a globally unique id
/// must supply their own via `RecordDraft::with_request_id`.
pub fn request_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
    format!("req-{millis}-{suffix}")
}
