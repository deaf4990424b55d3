//! Rule catalog inspection: the built-in rules with config overrides applied.

use std::fmt::Write as _;

use tabled::Tabled;

use airwatch_config::build_catalog;
use airwatch_core::{DetectionRule, Encryption, RuleKind, Thresholds};

use crate::cli::{RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Rule")]
    id: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Suppress")]
    suppress: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl RuleRow {
    fn new(rule: &DetectionRule, color: bool) -> Self {
        Self {
            id: rule.id.to_string(),
            enabled: if rule.enabled { "yes" } else { "no" }.into(),
            severity: output::severity_label(rule.severity, color),
            suppress: format!("{}h", rule.suppress_after_hours()),
            message: rule.template().as_str().to_owned(),
        }
    }
}

pub fn handle(args: &RulesArgs, ctx: &Context) -> Result<(), CliError> {
    let catalog = build_catalog(&ctx.config)?;

    let out = match &args.command {
        RulesCommand::List => {
            let rules: Vec<DetectionRule> = catalog.iter().cloned().collect();
            output::render_list(
                ctx.format,
                &rules,
                |r| RuleRow::new(r, ctx.color),
                |r| r.id.to_string(),
            )
        }
        RulesCommand::Show { rule } => {
            let kind = RuleKind::from(*rule);
            let rule = catalog.get(kind).ok_or_else(|| CliError::InvalidRule {
                message: format!("rule '{kind}' is not in the catalog"),
            })?;
            output::render_single(
                ctx.format,
                rule,
                |r| detail(r, ctx.color),
                |r| r.id.to_string(),
            )
        }
    };

    output::print_output(&out, ctx.quiet());
    Ok(())
}

fn detail(rule: &DetectionRule, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rule:       {}", rule.id);
    let _ = writeln!(out, "Enabled:    {}", rule.enabled);
    let _ = writeln!(out, "Severity:   {}", output::severity_label(rule.severity, color));
    let _ = writeln!(out, "Suppress:   {}h", rule.suppress_after_hours());
    let _ = writeln!(out, "Message:    {}", rule.template().as_str());
    match rule.thresholds() {
        Thresholds::RogueAp(t) => {
            let _ = writeln!(out, "Signal:     {} dBm", t.signal_strength_dbm);
            let _ = write!(out, "Blacklist:  {}", join(&t.encryption_blacklist));
        }
        Thresholds::MacSpoofing(t) => {
            let _ = write!(out, "Same OUI:   {} identifiers", t.same_vendor_macs);
        }
        Thresholds::WeakEncryption(t) => {
            let _ = write!(out, "Weak types: {}", join(&t.weak_encryption_types));
        }
    }
    out
}

fn join(types: &[Encryption]) -> String {
    if types.is_empty() {
        return "-".into();
    }
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_lists_family_thresholds() {
        let text = detail(&DetectionRule::builtin(RuleKind::WeakEncryption), false);
        assert!(text.contains("Weak types: WEP, WPA"));
        assert!(text.contains("Suppress:   24h"));

        let text = detail(&DetectionRule::builtin(RuleKind::MacSpoofing), false);
        assert!(text.contains("Same OUI:   3 identifiers"));
    }
}
