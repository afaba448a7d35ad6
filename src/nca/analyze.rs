//! Main NCA analysis orchestrator
//!
//! Computes every reported parameter of one validated profile.

use super::auc::auc_to_index;
use super::profile::Profile;
use super::terminal;
use super::types::*;

/// Perform complete NCA analysis on a profile
///
/// Parameters that cannot be estimated (no acceptable terminal regression, no
/// dose) are returned as `None`. This never fails on a validated profile.
pub(crate) fn analyze(profile: &Profile, options: &NCAOptions) -> NCARecord {
    let auc_last = auc_to_index(
        &profile.times,
        &profile.concentrations,
        profile.tlast_idx,
        options.auc_method,
    );
    let clast = profile.clast();

    let regression = terminal::lambda_z(
        &profile.times,
        &profile.concentrations,
        profile.cmax_idx,
        profile.tlast_idx,
        &options.lambda_z,
    );

    let (half_life, auc_inf, auc_pct_extrap) = match &regression {
        Some(fit) => {
            let auc_inf = terminal::auc_inf(auc_last, clast, fit.lambda_z);
            (
                Some(terminal::half_life(fit.lambda_z)),
                Some(auc_inf),
                Some(terminal::auc_extrap_pct(auc_last, auc_inf)),
            )
        }
        None => {
            tracing::warn!(
                "No acceptable terminal phase for subject {} ({}): half-life and clearance undefined",
                profile.subject,
                profile.group
            );
            (None, None, None)
        }
    };

    let clearance = match (profile.dose, auc_inf) {
        (Some(dose), Some(auc)) => {
            Some(terminal::clearance(dose, auc)).filter(|cl| cl.is_finite())
        }
        (None, Some(_)) => {
            tracing::warn!(
                "No dose recorded for subject {} ({}): clearance undefined",
                profile.subject,
                profile.group
            );
            None
        }
        _ => None,
    };

    tracing::debug!(
        subject = %profile.subject,
        group = %profile.group,
        cmax = profile.cmax(),
        auc_last,
        "NCA complete"
    );

    NCARecord {
        subject: profile.subject.clone(),
        group: profile.group,
        dose: profile.dose,
        cmax: profile.cmax(),
        tmax: profile.tmax(),
        clast,
        tlast: profile.tlast(),
        auc_last,
        auc_inf,
        auc_pct_extrap,
        half_life,
        clearance,
        regression,
    }
}
