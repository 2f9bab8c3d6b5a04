//! Graphviz rendering of target graphs.

use std::sync::Arc;

use itertools::Itertools;

use crate::graph::walk;
use crate::target::Target;

/// Render the graph below `roots` in DOT syntax.
///
/// Nodes are labelled with the job kind and short id; edges point from a
/// producer to each consumer, following the flow of data.
#[must_use]
pub fn render(roots: &[Arc<Target>]) -> String {
    let targets = walk(roots);
    let nodes = targets.iter().map(|target| {
        let id = target.id().short();
        let label = match target.output_dir() {
            Some(dir) => format!("{}\\n{id}\\n{}", target.name(), escape(dir.as_str())),
            None => format!("{}\\n{id}", target.name()),
        };
        format!("    \"{id}\" [label=\"{label}\"];\n")
    });
    let edges = targets.iter().flat_map(|target| {
        let consumer = target.id().short().to_owned();
        target
            .dependencies()
            .into_iter()
            .map(|dep| dep.id().short().to_owned())
            .unique()
            .map(move |producer| format!("    \"{producer}\" -> \"{consumer}\";\n"))
            .collect::<Vec<_>>()
    });
    format!(
        "digraph hwforge {{\n    rankdir=LR;\n{}{}}}\n",
        nodes.collect::<String>(),
        edges.collect::<String>()
    )
}

fn escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '"' => "\\\"".to_owned(),
            '\\' => "\\\\".to_owned(),
            other => other.to_string(),
        })
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::field_of;
    use crate::target::Params;
    use crate::value::Value;

    #[test]
    fn shared_producers_get_one_node_and_one_edge_per_consumer() {
        let dtc = Target::new("dtc", Params::new(), Some("build/meta".into()));
        let mut params = Params::new();
        params.insert("a".into(), field_of("dtb", &dtc).into());
        params.insert("b".into(), Value::Target(Arc::clone(&dtc)));
        let bsp = Target::new("bsp", params, None);
        let dot = render(&[Arc::clone(&bsp), Arc::clone(&dtc)]);

        assert!(dot.starts_with("digraph hwforge {"));
        assert_eq!(dot.matches("[label=").count(), 2);
        let edge = format!("\"{}\" -> \"{}\";", dtc.id().short(), bsp.id().short());
        assert_eq!(dot.matches(&edge).count(), 1);
        assert!(dot.contains("build/meta"));
    }
}
