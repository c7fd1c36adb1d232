use crate::commands::{check, plan};
#[cfg(feature = "mongodb")]
use crate::commands::apply;

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> Vec<CommandExample> {
    #[cfg_attr(not(feature = "mongodb"), allow(unused_mut))]
    let mut examples = vec![
        CommandExample {
            name: "plan",
            groups: plan::EXAMPLES,
        },
        CommandExample {
            name: "check",
            groups: check::EXAMPLES,
        },
    ];
    #[cfg(feature = "mongodb")]
    examples.push(CommandExample {
        name: "apply",
        groups: apply::EXAMPLES,
    });
    examples
}
