pub(crate) mod bootstrap;
pub(crate) mod commands;
