use crate::{
    function::Function,
    node::{CalleeKind, Literal, MemberAccess, Node},
    unit::CompilationUnit,
};

const INDENT: &str = "  ";

pub fn format_unit(unit: &CompilationUnit) -> String {
    let mut printer = Printer::default();
    printer.push("unit ");
    printer.push(&quote(&unit.name));
    printer.push("\n");

    for function in unit.functions() {
        printer.push("\n");
        printer.function(function);
    }

    printer.finish()
}

pub fn format_function(function: &Function) -> String {
    let mut printer = Printer::default();
    printer.function(function);
    printer.finish()
}

pub fn format_node(node: &Node) -> String {
    let mut printer = Printer::default();
    printer.node(node);
    printer.finish()
}

pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

pub fn callee_keyword(kind: CalleeKind) -> &'static str {
    match kind {
        CalleeKind::Function => "call",
        CalleeKind::PropertyGetter => "get",
        CalleeKind::Constructor => "new",
    }
}

#[derive(Default)]
struct Printer {
    output: String,
    depth: usize,
}

impl Printer {
    fn finish(self) -> String {
        self.output
    }

    fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.output.push_str(INDENT);
        }
    }

    fn function(&mut self, function: &Function) {
        self.push("fun ");
        self.push(&function.name);
        self.push("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&format!("{}: {}", param.name, param.ty));
        }
        self.push(&format!("): {}", function.return_type));

        match &function.body {
            Some(body @ Node::Block(_)) => {
                self.push(" ");
                self.node(body);
            }
            Some(body) => {
                self.push(" = ");
                self.node(body);
            }
            None => {}
        }
        self.push("\n");
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Literal(literal) => self.literal(literal),
            Node::VariableRef(var) => self.push(&var.name),
            Node::Variable(variable) => {
                self.push(&format!("val {}: {}", variable.name, variable.ty));
                if let Some(initializer) = &variable.initializer {
                    self.push(" = ");
                    self.node(initializer);
                }
            }
            Node::SetVariable(set) => {
                self.push(&format!("set {} = ", set.name));
                self.node(&set.value);
            }
            Node::MemberAccess(access) => self.member_access(access),
            Node::TypeOperator(wrap) => {
                self.push(&format!("typeop {}<{}>(", wrap.operator, wrap.type_operand));
                self.node(&wrap.argument);
                self.push(")");
            }
            Node::Block(block) => {
                self.push("{\n");
                self.depth += 1;
                for statement in &block.statements {
                    self.indent();
                    self.node(statement);
                    self.push("\n");
                }
                self.depth -= 1;
                self.indent();
                self.push("}");
            }
            Node::If(if_node) => {
                self.push("if (");
                self.node(&if_node.condition);
                self.push(") ");
                self.node(&if_node.then_branch);
                self.push(" else ");
                self.node(&if_node.else_branch);
            }
            Node::Return(ret) => {
                self.push("return ");
                self.node(&ret.value);
            }
        }
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.push("null"),
            Literal::Bool(value) => self.push(if *value { "true" } else { "false" }),
            Literal::Int(value) => self.push(&value.to_string()),
            Literal::String(value) => self.push(&quote(value)),
        }
    }

    fn member_access(&mut self, access: &MemberAccess) {
        self.push(callee_keyword(access.callee.kind));
        self.push(" ");
        self.push(&access.callee.name);
        self.push("(");

        let mut first = true;
        let mut separator = |printer: &mut Printer| {
            if !first {
                printer.push(", ");
            }
            first = false;
        };

        if let Some(receiver) = &access.dispatch_receiver {
            separator(self);
            self.push("dispatch = ");
            self.node(receiver);
        }
        if let Some(receiver) = &access.extension_receiver {
            separator(self);
            self.push("extension = ");
            self.node(receiver);
        }
        for argument in &access.arguments {
            separator(self);
            self.node(argument);
        }

        self.push(&format!("): {}", access.ty));
        if let Some(origin) = access.origin {
            self.push(&format!(" origin={}", origin));
        }
    }
}
