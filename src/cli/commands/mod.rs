pub(crate) mod common;

mod check;
mod register;
mod signatures;

use super::CommandDescriptor;

const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "register",
        aliases: &["collect"],
        parser: register::parse,
    },
    CommandDescriptor {
        name: "check",
        aliases: &[],
        parser: check::parse,
    },
    CommandDescriptor {
        name: "signatures",
        aliases: &["list"],
        parser: signatures::parse,
    },
];

pub(crate) fn descriptors() -> &'static [CommandDescriptor] {
    COMMANDS
}
