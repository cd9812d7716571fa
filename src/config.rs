//! # Tree configuration.
//!
//! Provides two configuration layers:
//! - [`Config`]: global defaults applied to every element that leaves a field unset;
//! - [`ElementConfig`]: a plain, recursive description of one element and its children.
//!
//! An [`ElementConfig`] is turned into an immutable [`Element`] tree with
//! [`ElementConfig::build`] (library defaults) or [`ElementConfig::build_with`]
//! (custom [`Config`]). Construction is where misconfiguration is rejected.
//!
//! ## Shape rules
//! - zero children → **Leaf**; one or more children → **Group**;
//! - zero children with an explicit `strategy` → [`ConfigError::EmptyGroup`] (rejected, never degraded);
//! - `deadline = 0` → [`ConfigError::ZeroDeadline`];
//! - leaf-only options on a group → [`ConfigError::LeafOnlyOption`];
//! - `stop_on_first_success` on a leaf is accepted and has no effect (a leaf has no siblings to stop).
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use waterfall::{ElementConfig, Strategy};
//!
//! let tree = ElementConfig::group(Strategy::Parallel)
//!     .with_id("root")
//!     .with_deadline(Duration::from_secs(2))
//!     .with_child(ElementConfig::leaf().with_id("a").with_outcome(true))
//!     .with_child(ElementConfig::leaf().with_id("b"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(tree.id(), "root");
//! assert_eq!(tree.leaves().len(), 2);
//! ```
//!
//! ## TOML
//! ```rust
//! use waterfall::ElementConfig;
//!
//! let cfg = ElementConfig::from_toml(r#"
//!     id = "root"
//!     strategy = "sequential"
//!     deadline = "2s"
//!
//!     [[children]]
//!     id = "first"
//!     simulated_outcome = true
//!     completion_latency = "200ms"
//! "#).unwrap();
//!
//! assert_eq!(cfg.children.len(), 1);
//! assert!(cfg.build().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::elements::{Element, Group, Leaf, Strategy};
use crate::error::ConfigError;

/// Global defaults for element construction and request wiring.
///
/// ## Field semantics
/// - `leaf_deadline`: deadline for leaves that do not set one;
/// - `group_deadline`: deadline for groups that do not set one;
/// - `completion_latency`: simulated latency for leaves that do not set one;
/// - `bus_capacity`: lifecycle event ring buffer size (min 1; clamped by Bus).
#[derive(Clone, Debug)]
pub struct Config {
    /// Default leaf deadline.
    pub leaf_deadline: Duration,
    /// Default group deadline (bounds the whole subtree).
    pub group_deadline: Duration,
    /// Default simulated completion latency for leaves.
    pub completion_latency: Duration,
    /// Capacity of the lifecycle event broadcast channel.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `leaf_deadline = 300ms`
    /// - `group_deadline = 200ms`
    /// - `completion_latency = 100ms`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            leaf_deadline: Duration::from_millis(300),
            group_deadline: Duration::from_millis(200),
            completion_latency: Duration::from_millis(100),
            bus_capacity: 1024,
        }
    }
}

/// Plain description of one element of the tree.
///
/// The same struct describes both variants; the number of `children` decides which one
/// is built. Unset durations are resolved against [`Config`] at build time.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementConfig {
    /// Element identifier (diagnostics only, need not be unique).
    pub id: String,
    /// Traversal strategy; only meaningful for groups.
    pub strategy: Option<Strategy>,
    /// Evaluation deadline (`None` → `Config::leaf_deadline` / `Config::group_deadline`).
    #[serde(with = "humantime_serde")]
    pub deadline: Option<Duration>,
    /// Abandon remaining siblings once one child reports success (groups only).
    pub stop_on_first_success: bool,
    /// Participate in the request-wide first-success notification (leaves only).
    pub notify_on_first_success: bool,
    /// Outcome reported if the leaf completes before its deadline (leaves only).
    pub simulated_outcome: bool,
    /// Simulated time to completion (`None` → `Config::completion_latency`; leaves only).
    #[serde(with = "humantime_serde")]
    pub completion_latency: Option<Duration>,
    /// Ordered children; non-empty makes this element a group.
    pub children: Vec<ElementConfig>,
}

impl ElementConfig {
    /// Starts a leaf description with every field at its default.
    pub fn leaf() -> Self {
        Self::default()
    }

    /// Starts a group description with the given strategy.
    ///
    /// At least one child must be added before building.
    pub fn group(strategy: Strategy) -> Self {
        Self {
            strategy: Some(strategy),
            ..Self::default()
        }
    }

    /// Parses a tree description from a TOML document.
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    /// Returns a copy with updated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns a copy with updated deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns a copy with updated simulated outcome.
    pub fn with_outcome(mut self, succeeded: bool) -> Self {
        self.simulated_outcome = succeeded;
        self
    }

    /// Returns a copy with updated completion latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.completion_latency = Some(latency);
        self
    }

    /// Returns a copy that stops the group after its first successful child.
    ///
    /// Ignored on leaves.
    pub fn stop_on_first_success(mut self) -> Self {
        self.stop_on_first_success = true;
        self
    }

    /// Returns a copy whose success may trigger the request-wide notification.
    pub fn notify_on_first_success(mut self) -> Self {
        self.notify_on_first_success = true;
        self
    }

    /// Returns a copy with one more child appended.
    pub fn with_child(mut self, child: ElementConfig) -> Self {
        self.children.push(child);
        self
    }

    /// Builds an element tree using [`Config::default`].
    pub fn build(&self) -> Result<Element, ConfigError> {
        self.build_with(&Config::default())
    }

    /// Builds an element tree, resolving unset fields against `cfg`.
    ///
    /// Validation is recursive (pre-order); the first violation is returned.
    pub fn build_with(&self, cfg: &Config) -> Result<Element, ConfigError> {
        if self.children.is_empty() {
            self.build_leaf(cfg)
        } else {
            self.build_group(cfg)
        }
    }

    fn build_leaf(&self, cfg: &Config) -> Result<Element, ConfigError> {
        if self.strategy.is_some() {
            return Err(ConfigError::EmptyGroup {
                id: self.id.clone(),
            });
        }
        let deadline = self.resolve_deadline(cfg.leaf_deadline)?;
        let latency = self.completion_latency.unwrap_or(cfg.completion_latency);

        Ok(Element::from(Leaf::new(
            self.id.clone(),
            self.simulated_outcome,
            latency,
            deadline,
            self.notify_on_first_success,
        )))
    }

    fn build_group(&self, cfg: &Config) -> Result<Element, ConfigError> {
        let leaf_only = [
            ("notify_on_first_success", self.notify_on_first_success),
            ("simulated_outcome", self.simulated_outcome),
            ("completion_latency", self.completion_latency.is_some()),
        ];
        if let Some((option, _)) = leaf_only.iter().find(|(_, set)| *set) {
            return Err(ConfigError::LeafOnlyOption {
                id: self.id.clone(),
                option: *option,
            });
        }
        let deadline = self.resolve_deadline(cfg.group_deadline)?;
        let children = self
            .children
            .iter()
            .map(|child| child.build_with(cfg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Element::from(Group::new(
            self.id.clone(),
            self.strategy.unwrap_or_default(),
            deadline,
            self.stop_on_first_success,
            children,
        )))
    }

    fn resolve_deadline(&self, fallback: Duration) -> Result<Duration, ConfigError> {
        match self.deadline.unwrap_or(fallback) {
            Duration::ZERO => Err(ConfigError::ZeroDeadline {
                id: self.id.clone(),
            }),
            d => Ok(d),
        }
    }
}
