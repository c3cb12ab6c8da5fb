//! `pangosync sync`: one reconciliation pass.

use std::fmt::Write as _;

use pangosync_api::PangolinClient;
use pangosync_config::Settings;
use pangosync_core::{
    CleanupStatus, ExistingPolicy, Forward, ForwardReport, Outcome, ReapedResource, Reconciler,
    RunReport,
};
use tabled::Tabled;

use crate::cli::{GlobalOpts, SyncArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ForwardRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Forward")]
    key: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn target_label(forward: &Forward) -> String {
    match forward {
        Forward::Http(h) => format!(
            "{}://{}:{}",
            h.target_method.as_ref().to_lowercase(),
            h.target_host,
            h.target_port
        ),
        Forward::Port(p) => format!("{}:{}", p.target_host, p.target_port),
    }
}

fn outcome_detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Created { resource_id, .. }
        | Outcome::Updated { resource_id, .. }
        | Outcome::UpToDate { resource_id } => format!("resource {resource_id}"),
        Outcome::Skipped => "already in Pangolin".into(),
        Outcome::Failed(failure) => failure.to_string(),
    }
}

impl ForwardRow {
    fn new(r: &ForwardReport, color: bool) -> Self {
        Self {
            kind: r.forward.kind_label(),
            key: r.forward.key().to_string(),
            site: r.forward.site_name().to_owned(),
            target: target_label(&r.forward),
            status: output::status(r.outcome.label(), color),
            detail: outcome_detail(&r.outcome),
        }
    }
}

#[derive(Tabled)]
struct OrphanRow {
    #[tabled(rename = "Orphan")]
    description: String,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl OrphanRow {
    fn new(r: &ReapedResource, color: bool) -> Self {
        let (label, detail) = match &r.failure {
            None => ("deleted", String::new()),
            Some(f) => ("failed", f.to_string()),
        };
        Self {
            description: r.description.clone(),
            id: r.orphan.resource_id,
            status: output::status(label, color),
            detail,
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn summary(report: &RunReport) -> String {
    let mut out = format!(
        "{} created, {} updated, {} unchanged, {} failed",
        report.created(),
        report.updated(),
        report.unchanged(),
        report.failed()
    );
    if let Some(ref e) = report.snapshot_error {
        let _ = write!(out, "; resource snapshot unavailable ({e})");
    }
    match &report.cleanup {
        CleanupStatus::Disabled => out.push_str("; cleanup disabled"),
        CleanupStatus::SkippedIncomplete => {
            out.push_str("; cleanup skipped (desired state incomplete)");
        }
        CleanupStatus::Ran(reap) => {
            let _ = write!(
                out,
                "; {} orphan(s) deleted, {} failed",
                reap.deleted_count(),
                reap.failed_count()
            );
        }
    }
    out
}

fn detail(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    if !report.forwards.is_empty() {
        let rows: Vec<ForwardRow> = report
            .forwards
            .iter()
            .map(|r| ForwardRow::new(r, color))
            .collect();
        let _ = writeln!(out, "{}", output::render_table(&rows));
    }
    if let Some(reap) = report.reap() {
        if !reap.resources.is_empty() {
            let rows: Vec<OrphanRow> = reap
                .resources
                .iter()
                .map(|r| OrphanRow::new(r, color))
                .collect();
            let _ = writeln!(out, "{}", output::render_table(&rows));
        }
    }
    out.push_str(&summary(report));
    out
}

fn plain(report: &RunReport) -> String {
    let mut lines: Vec<String> = report
        .forwards
        .iter()
        .map(|r| format!("{}\t{}", r.forward.key(), r.outcome.label()))
        .collect();
    if let Some(reap) = report.reap() {
        lines.extend(reap.resources.iter().map(|r| {
            let label = if r.deleted() { "deleted" } else { "failed" };
            format!("{}\t{label}", r.orphan.key)
        }));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: SyncArgs,
    settings: &Settings,
    plane: PangolinClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut sync_config = settings.sync_config();
    if args.cleanup {
        sync_config.cleanup = true;
    }
    if args.no_cleanup {
        sync_config.cleanup = false;
    }
    if args.update {
        sync_config.on_existing = ExistingPolicy::Update;
    }
    let strict = args.strict || settings.strict;

    let mut reconciler = Reconciler::new(plane, sync_config);
    for (site, client) in config::discovery_sources(settings)? {
        reconciler = reconciler.with_source(site, client);
    }

    let report = reconciler.run().await;

    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &report, |r| detail(r, color), plain)?;
    output::print_output(&out, global.quiet);

    if strict && report.has_failures() {
        return Err(CliError::PartialFailure {
            failed: report.failure_count(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pangosync_core::{
        Failure, ForwardKey, HttpForward, HttpMethod, Orphan, PortForward, Protocol, ReapReport,
    };

    use super::*;

    fn report() -> RunReport {
        RunReport {
            forwards: vec![
                ForwardReport {
                    forward: Forward::Http(HttpForward {
                        subdomain: "grafana".into(),
                        domain: "example.com".into(),
                        site_name: "site-a".into(),
                        target_host: "10.0.0.7".into(),
                        target_port: 3000,
                        target_method: HttpMethod::Http,
                    }),
                    outcome: Outcome::Created {
                        resource_id: 7,
                        target_id: 8,
                    },
                },
                ForwardReport {
                    forward: Forward::Port(PortForward {
                        protocol: Protocol::Tcp,
                        site_name: "site-z".into(),
                        source_port: 5000,
                        target_host: "10.0.0.8".into(),
                        target_port: 5000,
                        name: None,
                    }),
                    outcome: Outcome::Failed(Failure::MissingSite {
                        site_name: "site-z".into(),
                    }),
                },
            ],
            cleanup: CleanupStatus::Ran(ReapReport {
                resources: vec![ReapedResource {
                    orphan: Orphan {
                        resource_id: 3,
                        key: ForwardKey::Domain("old.example.com".into()),
                    },
                    site_name: "site-a".into(),
                    description: "old.example.com→ unknown (site-a)".into(),
                    failure: None,
                }],
            }),
            snapshot_error: None,
        }
    }

    #[test]
    fn summary_counts_everything() {
        assert_eq!(
            summary(&report()),
            "1 created, 0 updated, 0 unchanged, 1 failed; 1 orphan(s) deleted, 0 failed"
        );
    }

    #[test]
    fn summary_reports_missing_snapshot() {
        let report = RunReport {
            forwards: Vec::new(),
            cleanup: CleanupStatus::SkippedIncomplete,
            snapshot_error: Some("API error: down".into()),
        };
        assert_eq!(
            summary(&report),
            "0 created, 0 updated, 0 unchanged, 0 failed; resource snapshot unavailable \
             (API error: down); cleanup skipped (desired state incomplete)"
        );
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn plain_lists_keys_and_status() {
        assert_eq!(
            plain(&report()),
            "grafana.example.com\tcreated\nTCP:5000\tfailed\nold.example.com\tdeleted"
        );
    }

    #[test]
    fn table_without_color_has_plain_labels() {
        let text = detail(&report(), false);
        assert!(text.contains("http://10.0.0.7:3000"));
        assert!(text.contains("no siteId for site 'site-z'"));
        assert!(text.contains("old.example.com→ unknown (site-a)"));
    }
}
