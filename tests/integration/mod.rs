//! Integration tests driving the sm-bump binary against temporary repositories

mod helpers;

mod test_apply_patches;
mod test_cli;
mod test_config;
