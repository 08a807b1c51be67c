use config_rules_core::evaluation::{batched, Evaluation};
use serde_json::json;

pub trait EvaluationSink {
    /// Delivers one batch of at most [`config_rules_core::evaluation::PUT_EVALUATIONS_BATCH_LIMIT`]
    /// verdicts, echoing the invocation's result token.
    fn put_evaluations(&self, batch: &[Evaluation], result_token: &str) -> Result<(), String>;
}

/// Submits the full verdict list in contiguous order-preserving batches.
///
/// An empty list performs zero sink calls. There is no retry and no rollback:
/// a mid-sequence failure leaves earlier batches delivered and propagates the
/// error to the caller.
pub fn submit_in_batches(
    sink: &dyn EvaluationSink,
    evaluations: &[Evaluation],
    result_token: &str,
) -> Result<usize, String> {
    let mut batches_submitted = 0usize;
    for batch in batched(evaluations) {
        log_sink_info(
            "submitting_batch",
            json!({
                "batch_index": batches_submitted,
                "batch_size": batch.len(),
            }),
        );
        sink.put_evaluations(batch, result_token)?;
        batches_submitted += 1;
    }

    Ok(batches_submitted)
}

fn log_sink_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "evaluation_sink",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use config_rules_core::evaluation::{Compliance, ResourceKind};

    use super::*;

    struct CapturingSink {
        batches: Mutex<Vec<Vec<Evaluation>>>,
        tokens: Mutex<Vec<String>>,
        fail_on_batch: Option<usize>,
    }

    impl CapturingSink {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                tokens: Mutex::new(Vec::new()),
                fail_on_batch: None,
            }
        }

        fn failing_on_batch(index: usize) -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                tokens: Mutex::new(Vec::new()),
                fail_on_batch: Some(index),
            }
        }

        fn batches(&self) -> Vec<Vec<Evaluation>> {
            self.batches.lock().expect("poisoned mutex").clone()
        }

        fn tokens(&self) -> Vec<String> {
            self.tokens.lock().expect("poisoned mutex").clone()
        }
    }

    impl EvaluationSink for CapturingSink {
        fn put_evaluations(&self, batch: &[Evaluation], result_token: &str) -> Result<(), String> {
            let mut batches = self.batches.lock().expect("poisoned mutex");
            if self.fail_on_batch == Some(batches.len()) {
                return Err("simulated submission failure".to_string());
            }
            batches.push(batch.to_vec());
            self.tokens
                .lock()
                .expect("poisoned mutex")
                .push(result_token.to_string());
            Ok(())
        }
    }

    fn evaluations(count: usize) -> Vec<Evaluation> {
        (0..count)
            .map(|index| {
                Evaluation::new(
                    ResourceKind::KmsKey,
                    format!("key-{index}"),
                    Compliance::Compliant,
                    "2026-02-14T00:00:00Z"
                        .parse()
                        .expect("test timestamp should parse"),
                )
            })
            .collect()
    }

    #[test]
    fn empty_list_performs_zero_calls() {
        let sink = CapturingSink::new();
        let submitted =
            submit_in_batches(&sink, &[], "token-1").expect("empty submission should pass");

        assert_eq!(submitted, 0);
        assert!(sink.batches().is_empty());
    }

    #[test]
    fn splits_250_verdicts_into_three_ordered_calls() {
        let sink = CapturingSink::new();
        let submitted = submit_in_batches(&sink, &evaluations(250), "token-1")
            .expect("submission should pass");

        assert_eq!(submitted, 3);
        let batches = sink.batches();
        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![100, 100, 50]
        );
        assert_eq!(batches[0][0].resource_id, "key-0");
        assert_eq!(batches[2][49].resource_id, "key-249");
        assert!(sink.tokens().iter().all(|token| token == "token-1"));
    }

    #[test]
    fn mid_sequence_failure_keeps_earlier_batches_delivered() {
        let sink = CapturingSink::failing_on_batch(1);
        let error = submit_in_batches(&sink, &evaluations(250), "token-1")
            .expect_err("second batch should fail");

        assert!(error.contains("simulated submission failure"));
        assert_eq!(sink.batches().len(), 1);
        assert_eq!(sink.batches()[0].len(), 100);
    }
}
