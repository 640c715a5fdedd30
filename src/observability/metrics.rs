use prometheus::{
    Counter, Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub ride_requests_total: IntCounterVec,
    pub ride_transitions_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub drivers_available: IntGauge,
    pub fares_settled_total: Counter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let ride_requests_total = IntCounterVec::new(
            Opts::new("ride_requests_total", "Ride requests by dispatch outcome"),
            &["outcome"],
        )
        .expect("valid ride_requests_total metric");

        let ride_transitions_total = IntCounterVec::new(
            Opts::new(
                "ride_transitions_total",
                "Ride lifecycle transitions by transition and outcome",
            ),
            &["transition", "outcome"],
        )
        .expect("valid ride_transitions_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of driver selection and reservation in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let drivers_available = IntGauge::new(
            "drivers_available",
            "Drivers whose vehicle is currently available",
        )
        .expect("valid drivers_available metric");

        let fares_settled_total = Counter::new(
            "fares_settled_total",
            "Sum of fares moved from riders to drivers",
        )
        .expect("valid fares_settled_total metric");

        registry
            .register(Box::new(ride_requests_total.clone()))
            .expect("register ride_requests_total");
        registry
            .register(Box::new(ride_transitions_total.clone()))
            .expect("register ride_transitions_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(drivers_available.clone()))
            .expect("register drivers_available");
        registry
            .register(Box::new(fares_settled_total.clone()))
            .expect("register fares_settled_total");

        Self {
            registry,
            ride_requests_total,
            ride_transitions_total,
            dispatch_latency_seconds,
            drivers_available,
            fares_settled_total,
        }
    }

    pub fn record_transition(&self, transition: &str, ok: bool) {
        let outcome = if ok { "success" } else { "error" };
        self.ride_transitions_total
            .with_label_values(&[transition, outcome])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
