// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Breakdown Signature Catalog
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! The twelve breakdown-signature detectors, in four families:
//!
//! - **Rigidity** — attractor dogmatism, belief calcification, metric
//!   crystallization (over-constraint).
//! - **Fragmentation** — attractor splintering, coherence dissolution,
//!   reference decay (under-constraint).
//! - **Inflation** — delusional expansion, semantic hypercoherence,
//!   recurgent parasitism (runaway self-reinforcement).
//! - **Observer-coupling** — paranoid interpretation, observer
//!   solipsism, semantic narcissism (interpretation drift).
//!
//! Detector contract: zero or one record per call, severity clipped to
//! [0, 1], missing inputs absorbed into "no record", equal inputs to
//! equal outputs over a fixed store snapshot. Aggregate sweeps never
//! fail the batch for one detector's error; they count the skip and
//! continue.

pub mod common;
pub mod fragmentation;
pub mod inflation;
pub mod observer_coupling;
pub mod rigidity;

use serde::{Deserialize, Serialize};

use recurgent_types::{
    BatchOutcome, Deadline, ManifoldPoint, RecurgentResult, SignatureFamily, SignatureRecord,
};

pub use common::DetectorContext;
pub use fragmentation::{
    attractor_splintering, coherence_dissolution, reference_decay, DecayParams,
    DissolutionParams, SplinteringParams,
};
pub use inflation::{
    delusional_expansion, recurgent_parasitism, semantic_hypercoherence, ExpansionParams,
    HypercoherenceParams, ParasitismParams,
};
pub use observer_coupling::{
    observer_solipsism, paranoid_interpretation, semantic_narcissism, NarcissismParams,
    ParanoiaParams, SolipsismParams,
};
pub use rigidity::{
    attractor_dogmatism, belief_calcification, metric_crystallization, CalcificationParams,
    CrystallizationParams, DogmatismParams,
};

/// Thresholds for all twelve detectors; defaults carry the catalog
/// values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorParams {
    pub dogmatism: DogmatismParams,
    pub calcification: CalcificationParams,
    pub crystallization: CrystallizationParams,
    pub splintering: SplinteringParams,
    pub dissolution: DissolutionParams,
    pub decay: DecayParams,
    pub expansion: ExpansionParams,
    pub hypercoherence: HypercoherenceParams,
    pub parasitism: ParasitismParams,
    pub paranoia: ParanoiaParams,
    pub solipsism: SolipsismParams,
    pub narcissism: NarcissismParams,
}

type Detector<'c> = (
    &'static str,
    Box<dyn Fn() -> RecurgentResult<Option<SignatureRecord>> + 'c>,
);

fn family_detectors<'c>(
    ctx: &'c DetectorContext<'_>,
    point: &'c ManifoldPoint,
    params: &'c DetectorParams,
    family: SignatureFamily,
) -> Vec<Detector<'c>> {
    match family {
        SignatureFamily::Rigidity => vec![
            (
                "attractor_dogmatism",
                Box::new(|| attractor_dogmatism(ctx, point, &params.dogmatism)),
            ),
            (
                "belief_calcification",
                Box::new(|| belief_calcification(ctx, point, &params.calcification)),
            ),
            (
                "metric_crystallization",
                Box::new(|| metric_crystallization(ctx, point, &params.crystallization)),
            ),
        ],
        SignatureFamily::Fragmentation => vec![
            (
                "attractor_splintering",
                Box::new(|| attractor_splintering(ctx, point, &params.splintering)),
            ),
            (
                "coherence_dissolution",
                Box::new(|| coherence_dissolution(ctx, point, &params.dissolution)),
            ),
            (
                "reference_decay",
                Box::new(|| reference_decay(ctx, point, &params.decay)),
            ),
        ],
        SignatureFamily::Inflation => vec![
            (
                "delusional_expansion",
                Box::new(|| delusional_expansion(ctx, point, &params.expansion)),
            ),
            (
                "semantic_hypercoherence",
                Box::new(|| semantic_hypercoherence(ctx, point, &params.hypercoherence)),
            ),
            (
                "recurgent_parasitism",
                Box::new(|| recurgent_parasitism(ctx, point, &params.parasitism)),
            ),
        ],
        SignatureFamily::ObserverCoupling => vec![
            (
                "paranoid_interpretation",
                Box::new(|| paranoid_interpretation(ctx, point, &params.paranoia)),
            ),
            (
                "observer_solipsism",
                Box::new(|| observer_solipsism(ctx, point, &params.solipsism)),
            ),
            (
                "semantic_narcissism",
                Box::new(|| semantic_narcissism(ctx, point, &params.narcissism)),
            ),
        ],
    }
}

/// Run one family's detectors in catalog order.
pub fn detect_family(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &DetectorParams,
    family: SignatureFamily,
    deadline: &Deadline,
) -> BatchOutcome<SignatureRecord> {
    let mut outcome = BatchOutcome::empty();
    for (name, detector) in family_detectors(ctx, point, params, family) {
        if deadline.expired() {
            log::warn!("detector sweep truncated before {name}");
            outcome.complete = false;
            break;
        }
        match detector() {
            Ok(Some(record)) => outcome.records.push(record),
            Ok(None) => {}
            Err(e) => {
                log::warn!("{name} skipped for point {}: {e}", point.id);
                outcome.skipped += 1;
            }
        }
    }
    outcome
}

/// Run all twelve detectors in catalog order and concatenate records.
pub fn detect_all(
    ctx: &DetectorContext<'_>,
    point: &ManifoldPoint,
    params: &DetectorParams,
    deadline: &Deadline,
) -> BatchOutcome<SignatureRecord> {
    let mut outcome = BatchOutcome::empty();
    for family in [
        SignatureFamily::Rigidity,
        SignatureFamily::Fragmentation,
        SignatureFamily::Inflation,
        SignatureFamily::ObserverCoupling,
    ] {
        if !outcome.complete {
            break;
        }
        outcome.absorb(detect_family(ctx, point, params, family, deadline));
    }
    outcome
}
