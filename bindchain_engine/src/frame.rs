//! Binding chains.
//!
//! A [`Frame`] holds its own assignments plus a shared reference to the frame
//! it extends. Query stages extend a partial solution by sealing it and
//! creating a child frame on top, instead of copying it; one prefix can thus
//! be shared by any number of alternative extensions.
//!
//! Lookups check the local entries first and then walk toward the root, so a
//! local entry shadows an ancestor's entry for the same variable. Sizes and
//! variable enumeration do not deduplicate: every assignment along the path
//! counts, shadowed ones included.

use std::{
    fmt, iter,
    sync::{Arc, Weak},
};

use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::{
    policy::CheckPolicy,
    storage::{BindingError, FrameStorage, MultiStorage, SingleStorage},
    term::Term,
    var::Var,
};

pub type Vars<'a> = Box<dyn Iterator<Item = &'a Var> + 'a>;

/// Read access to a binding: a mapping from variables to values.
///
/// Adding entries is not part of this trait. A chain is populated through
/// [`Frame::add`] before it is sealed and read through `Binding` afterwards.
pub trait Binding: fmt::Debug + Send + Sync {
    /// The value from the nearest frame binding `var`.
    fn get(&self, var: &Var) -> Option<&Term>;

    /// Agrees with `get(var).is_some()`.
    fn contains(&self, var: &Var) -> bool;

    /// Number of assignments along the whole chain, shadowed ones included.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Parent variables first, then local ones. A variable bound at several
    /// frames appears once per frame.
    fn vars(&self) -> Vars<'_>;

    fn parent(&self) -> Option<&dyn Binding>;

    /// Sealed frames built on top of this one that are still alive, in
    /// sealing order. Navigation only; lookups never look at children.
    fn children(&self) -> Vec<Arc<Frame>> {
        Vec::new()
    }
}

impl<B: Binding + ?Sized> Binding for Arc<B> {
    fn get(&self, var: &Var) -> Option<&Term> {
        (**self).get(var)
    }

    fn contains(&self, var: &Var) -> bool {
        (**self).contains(var)
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn vars(&self) -> Vars<'_> {
        (**self).vars()
    }

    fn parent(&self) -> Option<&dyn Binding> {
        (**self).parent()
    }

    fn children(&self) -> Vec<Arc<Frame>> {
        (**self).children()
    }
}

/// One link of a binding chain.
///
/// A frame is populated through `&mut self` while it is being built and then
/// [sealed](Frame::seal) into an `Arc`, after which it is read-only and may be
/// shared across threads.
#[derive(Debug)]
pub struct Frame {
    parent: Option<Arc<Frame>>,
    storage: Box<dyn FrameStorage>,
    // Forward links only; strong references point from child to parent.
    children: RwLock<Vec<Weak<Frame>>>,
    policy: CheckPolicy,
}

impl Frame {
    /// A root using the process default policy.
    pub fn root() -> Self {
        Self::root_with_policy(CheckPolicy::process_default())
    }

    pub fn root_with_policy(policy: CheckPolicy) -> Self {
        Self::root_with_storage(policy, MultiStorage::new())
    }

    pub fn root_with_storage(policy: CheckPolicy, storage: impl FrameStorage + 'static) -> Self {
        Self {
            parent: None,
            storage: Box::new(storage),
            children: RwLock::new(Vec::new()),
            policy,
        }
    }

    /// A new frame on top of `parent`, inheriting its policy.
    pub fn extend(parent: &Arc<Frame>) -> Self {
        Self::extend_with_storage(parent, MultiStorage::new())
    }

    pub fn extend_with_storage(
        parent: &Arc<Frame>,
        storage: impl FrameStorage + 'static,
    ) -> Self {
        Self {
            parent: Some(Arc::clone(parent)),
            storage: Box::new(storage),
            children: RwLock::new(Vec::new()),
            policy: parent.policy,
        }
    }

    /// Extends `parent` with a sealed single-assignment frame.
    pub fn extend_one(
        parent: &Arc<Frame>,
        var: Var,
        value: Term,
    ) -> Result<Arc<Frame>, BindingError> {
        let mut frame = Self::extend_with_storage(parent, SingleStorage::new());
        frame.add(var, value)?;
        Ok(frame.seal())
    }

    /// Binds `var` at this frame. Ancestors are never touched.
    ///
    /// A missing value is logged and ignored. With checking on, a variable that
    /// is already bound along the chain is logged and then bound anyway, and
    /// the storage gets to validate the entry. Rejections by the storage are
    /// returned.
    pub fn add(&mut self, var: Var, value: impl Into<Option<Term>>) -> Result<(), BindingError> {
        let Some(value): Option<Term> = value.into() else {
            warn!(var = %var, "binding add with no value, ignored");
            return Ok(());
        };
        self.check_add(&var, &value)?;
        self.storage.insert(var, value)
    }

    fn check_add(&self, var: &Var, value: &Term) -> Result<(), BindingError> {
        if self.policy.checks_unique_names() {
            if let Some(existing) = self.get(var) {
                warn!(
                    var = %var,
                    value = %value,
                    existing = %existing,
                    "duplicate variable in binding chain"
                );
            }
        }
        if self.policy.checking {
            self.storage.validate(var, value)
        } else {
            Ok(())
        }
    }

    /// Ends construction. The parent records a weak link to the sealed frame.
    pub fn seal(self) -> Arc<Frame> {
        let frame = Arc::new(self);
        if let Some(parent) = &frame.parent {
            let mut children = parent.children.write();
            children.retain(|child| child.strong_count() > 0);
            children.push(Arc::downgrade(&frame));
            trace!(
                depth = frame.depth(),
                siblings = children.len() - 1,
                "sealed binding frame"
            );
        }
        frame
    }

    pub fn parent_frame(&self) -> Option<&Arc<Frame>> {
        self.parent.as_ref()
    }

    /// This frame, then its parent, up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Frame> {
        iter::successors(Some(self), |frame| frame.parent.as_deref())
    }

    /// Number of frames above this one; zero for a root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn policy(&self) -> CheckPolicy {
        self.policy
    }

    pub fn local_len(&self) -> usize {
        self.storage.len()
    }

    pub fn local_vars(&self) -> Vars<'_> {
        self.storage.vars()
    }

    pub fn local_get(&self, var: &Var) -> Option<&Term> {
        self.storage.get(var)
    }

    /// Renders only this frame's assignments.
    pub fn display_local(&self) -> LocalDisplay<'_> {
        LocalDisplay(self)
    }
}

impl Binding for Frame {
    fn get(&self, var: &Var) -> Option<&Term> {
        self.ancestors().find_map(|frame| frame.storage.get(var))
    }

    fn contains(&self, var: &Var) -> bool {
        self.ancestors().any(|frame| frame.storage.contains(var))
    }

    fn size(&self) -> usize {
        self.ancestors().map(|frame| frame.storage.len()).sum()
    }

    fn vars(&self) -> Vars<'_> {
        let mut frames: Vec<&Frame> = self.ancestors().collect();
        frames.reverse();
        Box::new(frames.into_iter().flat_map(|frame| frame.storage.vars()))
    }

    fn parent(&self) -> Option<&dyn Binding> {
        self.parent.as_deref().map(|parent| parent as &dyn Binding)
    }

    fn children(&self) -> Vec<Arc<Frame>> {
        self.children.read().iter().filter_map(Weak::upgrade).collect()
    }
}

/// Releases uniquely owned ancestors one at a time, so dropping a deep chain
/// does not recurse once per frame.
impl Drop for Frame {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(parent) = next {
            next = Arc::into_inner(parent).and_then(|mut frame| frame.parent.take());
        }
    }
}

pub struct LocalDisplay<'a>(&'a Frame);

impl LocalDisplay<'_> {
    fn is_blank(&self) -> bool {
        self.0.local_vars().all(Var::is_system)
    }
}

impl fmt::Display for LocalDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0;
        let mut sep = "";
        for var in frame.local_vars().filter(|var| !var.is_system()) {
            if let Some(value) = frame.local_get(var) {
                write!(f, "{}( {} = {} )", sep, var, value)?;
                sep = " ";
            }
        }
        Ok(())
    }
}

/// `( ?x = "1" ) ( ?y = <a> ) -> ( ?z = _:b0 )`: the leaf frame first, each
/// ancestor after an arrow. System variables and frames with nothing to show
/// are left out.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for frame in self.ancestors() {
            let local = frame.display_local();
            if local.is_blank() {
                continue;
            }
            write!(f, "{}{}", sep, local)?;
            sep = " -> ";
        }
        Ok(())
    }
}

/// Whether two bindings hold the same assignments, whatever their frame shapes.
///
/// Every variable of `left` must resolve to the same value (or to nothing) in
/// both, and every variable of `right` must be bound in `left`.
pub fn same<L, R>(left: &L, right: &R) -> bool
where
    L: Binding + ?Sized,
    R: Binding + ?Sized,
{
    left.vars().all(|var| left.get(var) == right.get(var))
        && right.vars().all(|var| left.contains(var))
}
