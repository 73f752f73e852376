use ethica_facts::{n3::LintReport, Statement};
use ethica_graph::{
    ChainRecord, CitationCount, Direction, ElementAnalysis, PredicateCount, ProofCount,
    RelationshipRecord, Session, StoreStatistics, ValidationReport, WeightAnalysis,
};
use std::path::PathBuf;

pub fn render_relationships(session: &Session, element_id: &str, records: &[RelationshipRecord]) -> String {
    let mut out = format!("# {} ({element_id})\n", session.label(element_id));
    if records.is_empty() {
        out.push_str("\nNo relationships.\n");
        return out;
    }

    out.push('\n');
    for record in records {
        let (arrow, other) = match record.direction {
            Direction::Outbound => ("->", &record.object),
            Direction::Inbound => ("<-", &record.subject),
        };
        out.push_str(&format!(
            "{arrow} {:<28} {other}{}\n",
            record.predicate,
            if record.inferred { "  [inferred]" } else { "" }
        ));
    }
    out
}

pub fn render_chains(element_id: &str, chains: &[ChainRecord]) -> String {
    if chains.is_empty() {
        return format!("No dependency chains for {element_id} (derived store is empty or has no match).\n");
    }

    let mut out = format!("Dependency chains for {element_id}:\n");
    for chain in chains {
        let kind = serde_json::to_value(chain.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {kind:<24} {} -[{}]-> {}\n",
            chain.start, chain.relationship, chain.end
        ));
    }
    out
}

pub fn render_weights(weights: &WeightAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!("Weights for {}:\n", weights.element_id));
    out.push_str(&format!("  inbound weight        {:>8.2}\n", weights.inbound_weight));
    out.push_str(&format!("  outbound weight       {:>8.2}\n", weights.outbound_weight));
    out.push_str(&format!("  transitive influence  {:>8.2}\n", weights.transitive_influence));
    out.push_str(&format!("  foundational score    {:>8.2}\n", weights.foundational_score));
    out.push_str(&format!("  dependency depth      {:>8}\n", weights.dependency_depth));
    out.push_str(&format!("  influence reach       {:>8}\n", weights.influence_reach));

    if !weights.relationship_breakdown.is_empty() {
        out.push_str("  breakdown:\n");
        for entry in &weights.relationship_breakdown {
            let direction = match entry.direction {
                Direction::Outbound => "out",
                Direction::Inbound => "in",
            };
            out.push_str(&format!(
                "    {:<20} {direction:<3} x{:<3} = {:>6.2}  ({})\n",
                entry.predicate.wire_name(),
                entry.count,
                entry.weight,
                entry
                    .related
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
    }
    out
}

pub fn render_inspection(session: &Session, analysis: &ElementAnalysis) -> String {
    let id = analysis.element_id.as_str();
    let mut out = render_relationships(session, id, &analysis.relationships);
    out.push('\n');
    out.push_str(&render_chains(id, &analysis.chains));
    out.push('\n');
    out.push_str(&render_weights(&analysis.weights));
    out
}

pub fn render_report(
    session: &Session,
    cited: &[CitationCount],
    proofs: &[ProofCount],
    reductio: &[ethica_facts::ElementId],
    predicates: &[PredicateCount],
) -> String {
    let mut md = String::new();

    md.push_str("## Most cited\n\n");
    md.push_str("| element | label | citations |\n");
    md.push_str("|---|---|---:|\n");
    for row in cited {
        md.push_str(&format!(
            "| `{}` | {} | {} |\n",
            row.element_id,
            session.label(row.element_id.as_str()),
            row.count
        ));
    }

    md.push_str("\n## Propositions with multiple proofs\n\n");
    if proofs.is_empty() {
        md.push_str("None.\n");
    }
    for row in proofs {
        md.push_str(&format!(
            "- `{}`: {} proofs ({})\n",
            row.proposition,
            row.count,
            row.proofs
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    md.push_str("\n## Proofs by reductio ad absurdum\n\n");
    if reductio.is_empty() {
        md.push_str("None.\n");
    }
    for id in reductio {
        md.push_str(&format!("- `{id}`\n"));
    }

    md.push_str("\n## Semantic relationships\n\n");
    for row in predicates {
        md.push_str(&format!("- {}: {}\n", row.predicate, row.count));
    }
    md
}

pub fn render_validation(report: &ValidationReport, lint: &[(PathBuf, LintReport)]) -> String {
    let mut out = String::new();
    for (path, findings) in lint {
        for finding in &findings.errors {
            out.push_str(&format!("error: {}:{}: {}\n", path.display(), finding.line, finding.message));
        }
        for finding in &findings.warnings {
            out.push_str(&format!("warning: {}:{}: {}\n", path.display(), finding.line, finding.message));
        }
    }
    for issue in &report.errors {
        out.push_str(&format!("error: {}\n", issue.message));
    }
    for issue in &report.warnings {
        out.push_str(&format!("warning: {}\n", issue.message));
    }

    let lint_errors: usize = lint.iter().map(|(_, r)| r.errors.len()).sum();
    let lint_warnings: usize = lint.iter().map(|(_, r)| r.warnings.len()).sum();
    out.push_str(&format!(
        "{} error(s), {} warning(s)\n",
        report.errors.len() + lint_errors,
        report.warnings.len() + lint_warnings
    ));
    out
}

pub fn render_statistics(stats: &StoreStatistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total triples:   {}\n", stats.total_triples));
    out.push_str(&format!("Total elements:  {}\n", stats.total_elements));
    out.push_str(&format!("Total citations: {}\n", stats.total_citations));

    out.push_str("\nElement types:\n");
    for row in &stats.element_types {
        out.push_str(&format!("  {:<14} {}\n", row.class, row.count));
    }

    if !stats.citations_by_citer.is_empty() {
        out.push_str("\nCitations made:\n");
        for row in &stats.citations_by_citer {
            out.push_str(&format!("  {:<24} {}\n", row.element_id, row.count));
        }
    }
    out
}

pub fn render_derived(statements: &[Statement]) -> String {
    ethica_facts::n3::to_n3(
        statements,
        ethica_facts::n3::DEFAULT_PREFIX,
        ethica_facts::n3::DEFAULT_NAMESPACE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethica_facts::{FactStore, Predicate};

    #[test]
    fn relationships_show_direction_and_inference() {
        let session = Session::from_asserted(FactStore::from_statements([
            Statement::new("I.prop.14", Predicate::Type, "Proposition"),
            Statement::new("I.prop.14", Predicate::Cites, "I.def.6"),
        ]));
        let text = render_relationships(&session, "I.def.6", &session.query("I.def.6"));
        assert!(text.starts_with("# I.def.6 (I.def.6)\n"));
        assert!(text.contains("<- citedBy"));
        assert!(text.contains("I.prop.14"));
        assert!(!text.contains("[inferred]"));

        let text = render_relationships(&session, "I.prop.14", &session.query("I.prop.14"));
        assert!(text.starts_with("# Part I, Proposition 14 (I.prop.14)\n"));
    }

    #[test]
    fn empty_chain_list_is_explained() {
        assert!(render_chains("I.prop.1", &[]).starts_with("No dependency chains"));
    }
}
