//! Tree dumps for the REPL: a plain-text post-order listing and a Graphviz
//! DOT rendering. Both are cosmetic; slots nothing was ever delivered to
//! render as `X`.

use crate::{Participant, Path, Scenario};

impl<S: Scenario> Participant<S> {
    /// Post-order text dump of the message tree, one `{input,path,output}`
    /// line per node, children before their parent.
    pub fn dump_text(&self) -> String {
        let mut out = String::new();
        self.write_text(self.context().topology.root(), &mut out);
        out
    }

    fn write_text(&self, path: &Path, out: &mut String) {
        for child in self.context().topology.children(path) {
            self.write_text(child, out);
        }
        out.push_str(&format!("{{{}}}\n", self.render_node(path)));
    }

    /// Graphviz rendering of the message tree: one node per path, one edge
    /// per parent-child relation, with the root hung off a synthetic
    /// `General` node.
    pub fn dump_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph byz {\n");
        out.push_str("rankdir=LR;\n");
        out.push_str("nodesep=.0025;\n");
        out.push_str(&format!("label=\"Process {}\";\n", self.id()));
        out.push_str("node [fontsize=8,width=.005,height=.005,shape=plaintext];\n");
        out.push_str("edge [fontsize=8,arrowsize=0.25];\n");
        self.write_dot(self.context().topology.root(), &mut out);
        out.push_str("};\n");
        out
    }

    fn write_dot(&self, path: &Path, out: &mut String) {
        for child in self.context().topology.children(path) {
            self.write_dot(child, out);
        }
        match path.parent() {
            Some(parent) if !parent.is_empty() => {
                out.push_str(&format!("\"{{{}}}\"->", self.render_node(&parent)));
            }
            _ => out.push_str("General->"),
        }
        out.push_str(&format!("\"{{{}}}\";\n", self.render_node(path)));
    }

    fn render_node(&self, path: &Path) -> String {
        match self.node(path) {
            Some(node) => format!("{},{},{}", node.input_value, path, node.output_value),
            None => format!("X,{},X", path),
        }
    }
}
