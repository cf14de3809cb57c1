//! `ppa quota`: show or change the local plan and today's allowance.

use super::Workspace;
use crate::output::{OutputMode, pretty_kv, render_mode};
use clap::{Args, ValueEnum};
use pastpaper_core::quota::{Plan, UsageProfile, save_usage};
use serde::Serialize;

#[derive(Args, Debug, Default)]
#[command(
    about = "Show or change the search plan",
    long_about = "Show the current plan and how many searches remain today. Free accounts get a \
                  fixed number of searches per day (3 unless configured); premium accounts are \
                  unlimited.",
    after_help = "EXAMPLES:\n    # Show today's allowance\n    ppa quota\n\n\
                  # Upgrade\n    ppa quota --plan premium"
)]
pub struct QuotaArgs {
    /// Switch to this plan.
    #[arg(long, value_enum)]
    pub plan: Option<PlanArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanArg {
    Free,
    Premium,
}

impl From<PlanArg> for Plan {
    fn from(arg: PlanArg) -> Self {
        match arg {
            PlanArg::Free => Self::Free,
            PlanArg::Premium => Self::Premium,
        }
    }
}

#[derive(Debug, Serialize)]
struct QuotaOutput {
    plan: Plan,
    used_today: u32,
    /// `None` means unlimited.
    daily_limit: Option<u32>,
    remaining: Option<u32>,
}

impl QuotaOutput {
    fn new(profile: &UsageProfile, today: chrono::NaiveDate, free_limit: u32) -> Self {
        Self {
            plan: profile.plan,
            used_today: profile.used_on(today),
            daily_limit: (profile.plan == Plan::Free).then_some(free_limit),
            remaining: profile.remaining(today, free_limit),
        }
    }
}

/// Execute `ppa quota`.
///
/// # Errors
///
/// Returns an error if the usage profile cannot be read or written.
pub fn run_quota(args: &QuotaArgs, output: OutputMode, ws: &Workspace) -> anyhow::Result<()> {
    let path = ws.usage_path();
    let mut profile = ws.usage(output)?;

    if let Some(plan) = args.plan {
        profile.set_plan(plan.into());
        save_usage(&path, &profile)?;
    }

    let today = chrono::Utc::now().date_naive();
    let payload = QuotaOutput::new(&profile, today, ws.config.quota.free_daily_searches);

    render_mode(
        output,
        &payload,
        |p, w| {
            writeln!(
                w,
                "plan={} used={} remaining={}",
                p.plan,
                p.used_today,
                p.remaining.map_or_else(|| "unlimited".to_string(), |n| n.to_string())
            )
        },
        |p, w| {
            pretty_kv(w, "Plan", p.plan.as_str())?;
            pretty_kv(w, "Used today", p.used_today.to_string())?;
            match (p.daily_limit, p.remaining) {
                (Some(limit), Some(remaining)) => {
                    pretty_kv(w, "Remaining", format!("{remaining} of {limit}"))
                }
                _ => pretty_kv(w, "Remaining", "unlimited"),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
    }

    #[test]
    fn free_profile_reports_limit_and_remaining() {
        let mut profile = UsageProfile::default();
        profile.record_search(day(1));
        let out = QuotaOutput::new(&profile, day(1), 3);
        assert_eq!(out.used_today, 1);
        assert_eq!(out.daily_limit, Some(3));
        assert_eq!(out.remaining, Some(2));
    }

    #[test]
    fn stale_usage_resets_on_a_new_day() {
        let mut profile = UsageProfile::default();
        profile.record_search(day(1));
        profile.record_search(day(1));
        let out = QuotaOutput::new(&profile, day(2), 3);
        assert_eq!(out.used_today, 0);
        assert_eq!(out.remaining, Some(3));
    }

    #[test]
    fn premium_is_unlimited() {
        let profile = UsageProfile {
            plan: Plan::Premium,
            ..UsageProfile::default()
        };
        let out = QuotaOutput::new(&profile, day(1), 3);
        assert_eq!(out.daily_limit, None);
        assert_eq!(out.remaining, None);
    }

    #[test]
    fn plan_arg_converts() {
        assert_eq!(Plan::from(PlanArg::Premium), Plan::Premium);
        assert_eq!(Plan::from(PlanArg::Free), Plan::Free);
    }
}
