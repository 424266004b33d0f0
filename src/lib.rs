//! sibling-prep - isolated npm test workspaces for sibling-module suites
//!
//! Integration tests for a module often span several independently-versioned
//! sibling modules. This crate prepares a disposable workspace for one such
//! run: it decides, per sibling dependency, whether to keep the stable
//! published specifier or substitute an in-development branch that matches the
//! branch currently under test, writes the resulting `package.json`, and
//! drives the installation sequence (bulk `npm install`, stale nested-copy
//! cleanup, and an optional clone+link path for the one dependency that
//! cannot go through the bulk manifest).
//!
//! Modules:
//! - [`branch`] - branch-under-test resolution and remote branch existence
//! - [`manifest`] - workspace manifest synthesis and host manifest parsing
//! - [`config`] - CLI/manifest config resolution into an immutable [`types::PrepPlan`]
//! - [`install`] - the ordered preparation pipeline
//! - [`npm`] - npm/git subprocess collaborators
//! - [`cleanup`] - nested dependency copy removal

pub mod branch;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod install;
pub mod manifest;
pub mod npm;
pub mod types;
pub mod ui;
