// catalog.rs — List the value and constraint catalogs the project policy yields.

use crate::project::ProjectConfig;

pub fn values(config: &ProjectConfig) -> anyhow::Result<()> {
    let coordinator = config.coordinator(false)?;
    let graph = coordinator.alignment_engine().value_graph();

    println!(
        "{:<16} {:<13} {:<7} {:<9} DESCRIPTION",
        "NAME", "CATEGORY", "WEIGHT", "PRIORITY"
    );
    println!("{}", "-".repeat(80));
    for value in graph.values() {
        println!(
            "{:<16} {:<13} {:<7.2} {:<9} {}",
            value.name,
            value.category.to_string(),
            value.weight,
            value.priority,
            value.description
        );
    }

    if !graph.relations().is_empty() {
        println!();
        println!("Relations:");
        for relation in graph.relations() {
            println!(
                "  {} -[{} {:.2}]-> {}",
                relation.source, relation.relation_type, relation.weight, relation.target
            );
        }
    }

    let conflicts = graph.find_conflicts();
    if !conflicts.is_empty() {
        println!();
        println!("Conflicts:");
        for (a, b) in conflicts {
            println!("  {} <-> {}", a.name, b.name);
        }
    }

    println!();
    println!(
        "Alignment threshold: {:.2}",
        coordinator.alignment_threshold()
    );
    Ok(())
}

pub fn constraints(config: &ProjectConfig) -> anyhow::Result<()> {
    let coordinator = config.coordinator(false)?;
    let checker = coordinator.constraint_engine();
    let custom: Vec<&str> = checker
        .custom_constraints()
        .iter()
        .map(|c| c.id.as_str())
        .collect();

    println!(
        "{:<10} {:<6} {:<10} {:<7} {:<7} NAME",
        "ID", "TYPE", "PRIORITY", "WEIGHT", "SOURCE"
    );
    println!("{}", "-".repeat(80));
    for constraint in checker
        .hard_constraints()
        .iter()
        .chain(checker.soft_constraints())
    {
        let source = if custom.contains(&constraint.id.as_str()) {
            "custom"
        } else {
            "builtin"
        };
        println!(
            "{:<10} {:<6} {:<10} {:<7.2} {:<7} {}",
            constraint.id,
            constraint.constraint_type.to_string(),
            constraint.priority.to_string(),
            constraint.weight,
            source,
            constraint.name
        );
    }
    Ok(())
}
