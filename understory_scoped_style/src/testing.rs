// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording engine for unit tests.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::classes::ClassNameMap;
use crate::engine::{CompileOptions, StyleEngine, StyleSheet};
use crate::rules::RuleTree;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TestConfig {
    pub(crate) color: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Compile { sheet: u32, link: bool },
    Attach(u32),
    Detach(u32),
    Update(u32, &'static str),
}

#[derive(Debug, thiserror::Error)]
#[error("mock engine refused to compile")]
pub(crate) struct MockError;

type Log = Rc<RefCell<Vec<Op>>>;

#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    log: Log,
    next: u32,
    failing: bool,
}

impl MockEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.log.borrow().clone()
    }
}

impl StyleEngine for MockEngine {
    type Config = TestConfig;
    type Sheet = MockSheet;
    type Error = MockError;

    fn compile(
        &mut self,
        rules: &RuleTree<TestConfig>,
        options: &CompileOptions,
    ) -> Result<MockSheet, MockError> {
        if self.failing {
            return Err(MockError);
        }
        let id = self.next;
        self.next += 1;
        self.log.borrow_mut().push(Op::Compile {
            sheet: id,
            link: options.link,
        });
        let classes = rules
            .names()
            .map(|name| (name.to_string(), format!("{name}-{id}")))
            .collect();
        Ok(MockSheet {
            id,
            log: Rc::clone(&self.log),
            attached: false,
            classes,
        })
    }
}

#[derive(Debug)]
pub(crate) struct MockSheet {
    id: u32,
    log: Log,
    attached: bool,
    classes: ClassNameMap,
}

impl MockSheet {
    pub(crate) fn id(&self) -> u32 {
        self.id
    }
}

impl StyleSheet for MockSheet {
    type Config = TestConfig;

    fn attach(&mut self) {
        self.attached = true;
        self.log.borrow_mut().push(Op::Attach(self.id));
    }

    fn detach(&mut self) {
        self.attached = false;
        self.log.borrow_mut().push(Op::Detach(self.id));
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn update(&mut self, config: &TestConfig) {
        self.log.borrow_mut().push(Op::Update(self.id, config.color));
    }

    fn classes(&self) -> &ClassNameMap {
        &self.classes
    }
}

pub(crate) fn class_of(name: &str, sheet: u32) -> String {
    format!("{name}-{sheet}")
}
