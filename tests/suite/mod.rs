mod config;
mod discovery;
mod pipeline;
mod shutdown;
