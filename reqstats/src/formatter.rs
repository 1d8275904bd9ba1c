use crate::Metrics;

use std::fmt::Write;

impl Metrics {
    /// Render the registry's current state in the Prometheus text
    /// exposition format, for an external scrape endpoint to serve.
    ///
    /// Label-tuples are emitted in sorted order so the output is
    /// deterministic. Histogram `le` bounds are inclusive and cumulative,
    /// ending with the `+Inf` overflow bucket whose count equals the
    /// `_count` line.
    pub fn prometheus(&self) -> String {
        let mut out = String::new();

        let name = format!("{}_requests_total", self.prefix);
        let _ = writeln!(out, "# HELP {name} Number of requests received by the server.");
        let _ = writeln!(out, "# TYPE {name} counter");
        let _ = writeln!(out, "{name} {}", self.requests.value());

        let name = format!("{}_responses_total", self.prefix);
        let _ = writeln!(out, "# HELP {name} Number of responses sent by the server.");
        let _ = writeln!(out, "# TYPE {name} counter");
        let mut responses: Vec<_> = self
            .responses
            .read()
            .iter()
            .map(|(labels, counter)| (labels.clone(), counter.value()))
            .collect();
        responses.sort_by(|a, b| a.0.cmp(&b.0));
        for (labels, count) in responses {
            let _ = writeln!(
                out,
                "{name}{{status=\"{}\",method=\"{}\"}} {count}",
                escape(&labels.status),
                escape(&labels.method)
            );
        }

        let name = format!("{}_histogram_response_time_seconds", self.prefix);
        let _ = writeln!(out, "# HELP {name} Server response time in seconds.");
        let _ = writeln!(out, "# TYPE {name} histogram");
        let mut times: Vec<_> = self
            .response_times
            .read()
            .iter()
            .map(|(status, histogram)| (status.clone(), histogram.clone()))
            .collect();
        times.sort_by(|a, b| a.0.cmp(&b.0));
        for (status, histogram) in times {
            let status = escape(&status);

            let mut cumulative = 0;
            for bucket in histogram.buckets() {
                cumulative += bucket.count();
                if bucket.is_overflow() {
                    let _ = writeln!(
                        out,
                        "{name}_bucket{{status=\"{status}\",le=\"+Inf\"}} {cumulative}"
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "{name}_bucket{{status=\"{status}\",le=\"{}\"}} {cumulative}",
                        bucket.upper()
                    );
                }
            }
            let _ = writeln!(out, "{name}_sum{{status=\"{status}\"}} {}", histogram.sum());
            let _ = writeln!(out, "{name}_count{{status=\"{status}\"}} {cumulative}");
        }

        out
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use crate::{Config, Metrics};

    fn metrics() -> Metrics {
        Metrics::new(&Config {
            namespace: "acme".to_string(),
            app_name: "billing".to_string(),
            subsystem: "grpc".to_string(),
            buckets_start: 0.0001,
            buckets_factor: 2.0,
            buckets_count: 10,
        })
        .unwrap()
    }

    #[test]
    fn families_carry_full_names() {
        let metrics = metrics();
        metrics.inc_request_counter();

        let exposition = metrics.prometheus();

        assert!(exposition.contains("# TYPE acme_grpc_billing_requests_total counter"));
        assert!(exposition.contains("acme_grpc_billing_requests_total 1\n"));
        assert!(exposition.contains("# TYPE acme_grpc_billing_responses_total counter"));
        assert!(exposition
            .contains("# TYPE acme_grpc_billing_histogram_response_time_seconds histogram"));
    }

    #[test]
    fn label_tuples_are_distinguished() {
        let metrics = metrics();

        for _ in 0..5 {
            metrics.inc_response_counter("200", "GET");
        }
        for _ in 0..2 {
            metrics.inc_response_counter("500", "GET");
        }

        let exposition = metrics.prometheus();

        assert!(exposition
            .contains("acme_grpc_billing_responses_total{status=\"200\",method=\"GET\"} 5\n"));
        assert!(exposition
            .contains("acme_grpc_billing_responses_total{status=\"500\",method=\"GET\"} 2\n"));
    }

    #[test]
    fn histogram_lines_are_cumulative() {
        let metrics = metrics();

        metrics.observe_response_time("200", 0.0001);
        metrics.observe_response_time("200", 0.00015);
        metrics.observe_response_time("200", 100.0);

        let exposition = metrics.prometheus();
        let name = "acme_grpc_billing_histogram_response_time_seconds";

        assert!(exposition.contains(&format!(
            "{name}_bucket{{status=\"200\",le=\"0.0001\"}} 1\n"
        )));
        assert!(exposition.contains(&format!(
            "{name}_bucket{{status=\"200\",le=\"0.0002\"}} 2\n"
        )));
        assert!(exposition.contains(&format!(
            "{name}_bucket{{status=\"200\",le=\"+Inf\"}} 3\n"
        )));
        assert!(exposition.contains(&format!("{name}_count{{status=\"200\"}} 3\n")));
        assert!(exposition.contains(&format!("{name}_sum{{status=\"200\"}} ")));
    }

    #[test]
    fn label_values_are_escaped() {
        let metrics = metrics();

        metrics.inc_response_counter("2\"00", "GET");

        let exposition = metrics.prometheus();
        assert!(exposition.contains("status=\"2\\\"00\""));
    }
}
