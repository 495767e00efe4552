//! Execution-scoped context.
//!
//! A [`Context`] carries values across API boundaries on the current thread.
//! Baggage is stored in it through [`BaggageExt`](crate::baggage::BaggageExt)
//! and read back by propagators on injection.
use crate::otel_warn;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasherDefault, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;


thread_local! {
    static CURRENT_CONTEXT: RefCell<ContextStack> = RefCell::new(ContextStack::default());
}

/// An immutable, execution-scoped collection of values keyed by type.
///
/// Writing a value returns a new context holding the previous values and the
/// new one. A context becomes the thread's current context with
/// [`attach`](Context::attach) and stops being current when the returned
/// [`ContextGuard`] is dropped.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::Context;
///
/// #[derive(Debug, PartialEq)]
/// struct RequestId(u64);
///
/// let _guard = Context::new().with_value(RequestId(7)).attach();
/// assert_eq!(Context::current().get::<RequestId>(), Some(&RequestId(7)));
/// ```
#[derive(Clone, Default)]
pub struct Context {
    entries: Option<Arc<EntryMap>>,
}

type EntryMap = HashMap<TypeId, Arc<dyn Any + Sync + Send>, BuildHasherDefault<IdHasher>>;

impl Context {
    /// Creates an empty `Context`. It does not allocate.
    pub fn new() -> Self {
        Context::default()
    }

    /// Returns a snapshot of the current thread's context.
    pub fn current() -> Self {
        Self::map_current(|cx| cx.clone())
    }

    /// Applies a function to the current context returning its value.
    ///
    /// Avoids cloning the current context when only a derived value is
    /// needed. Attaching a context from inside `f` panics.
    pub fn map_current<T>(f: impl FnOnce(&Context) -> T) -> T {
        CURRENT_CONTEXT.with(|cx| f(&cx.borrow().current_cx))
    }

    /// Returns a clone of the current thread's context with the given value.
    pub fn current_with_value<T: 'static + Send + Sync>(value: T) -> Self {
        Self::map_current(|cx| cx.with_value(value))
    }

    /// Returns a reference to the entry for the corresponding value type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.entries
            .as_ref()?
            .get(&TypeId::of::<T>())?
            .downcast_ref()
    }

    /// Returns a copy of the context with the new value included, replacing
    /// any previous value of the same type.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_baggage::Context;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Tenant(&'static str);
    ///
    /// let empty = Context::new();
    /// let with_tenant = empty.with_value(Tenant("acme"));
    ///
    /// assert_eq!(empty.get::<Tenant>(), None);
    /// assert_eq!(with_tenant.get::<Tenant>(), Some(&Tenant("acme")));
    /// ```
    pub fn with_value<T: 'static + Send + Sync>(&self, value: T) -> Self {
        let mut entries = self
            .entries
            .as_deref()
            .cloned()
            .unwrap_or_default();
        entries.insert(TypeId::of::<T>(), Arc::new(value));
        Context {
            entries: Some(Arc::new(entries)),
        }
    }

    /// Makes this context the current context of the thread.
    ///
    /// Dropping the returned [`ContextGuard`] restores the context that was
    /// current before. The guard must be bound to a named variable, `let _ =`
    /// drops it immediately.
    ///
    /// ```
    /// use opentelemetry_baggage::Context;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Tenant(&'static str);
    ///
    /// {
    ///     let _guard = Context::new().with_value(Tenant("acme")).attach();
    ///     assert_eq!(Context::current().get::<Tenant>(), Some(&Tenant("acme")));
    /// }
    /// assert_eq!(Context::current().get::<Tenant>(), None);
    /// ```
    pub fn attach(self) -> ContextGuard {
        let cx_pos = CURRENT_CONTEXT.with(|cx| cx.borrow_mut().push(self));

        ContextGuard {
            cx_pos,
            _marker: PhantomData,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("entries count", &self.entries.as_ref().map_or(0, |e| e.len()))
            .finish()
    }
}

/// A guard that resets the current context to the prior context when dropped.
#[derive(Debug)]
pub struct ContextGuard {
    cx_pos: u16,
    // !Send, positions are only meaningful on the thread that attached
    _marker: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let pos = self.cx_pos;
        if pos > ContextStack::BASE_POS && pos < ContextStack::MAX_POS {
            CURRENT_CONTEXT.with(|stack| stack.borrow_mut().pop_id(pos));
        }
    }
}

/// `TypeId` is already a hash, the hasher passes it through.
#[derive(Clone, Default, Debug)]
struct IdHasher(u64);

impl Hasher for IdHasher {
    fn write(&mut self, _: &[u8]) {
        unreachable!("TypeId calls write_u64");
    }

    #[inline]
    fn write_u64(&mut self, id: u64) {
        self.0 = id;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

/// Contexts attached to this thread.
///
/// Guards may be dropped out of order: a position below the top is only
/// cleared, and the previous context is restored once the top is popped.
struct ContextStack {
    current_cx: Context,
    stack: Vec<Option<Context>>,
    _marker: PhantomData<*const ()>,
}

impl ContextStack {
    const BASE_POS: u16 = 0;
    const MAX_POS: u16 = u16::MAX;
    const INITIAL_CAPACITY: usize = 8;

    #[inline(always)]
    fn push(&mut self, cx: Context) -> u16 {
        let next_pos = self.stack.len() + 1;
        if next_pos < ContextStack::MAX_POS.into() {
            let previous = std::mem::replace(&mut self.current_cx, cx);
            self.stack.push(Some(previous));
            next_pos as u16
        } else {
            otel_warn!(
                name: "Context.AttachFailed",
                message = format!(
                    "Too many contexts. Max limit is {}. The current context is unchanged.",
                    ContextStack::MAX_POS
                )
            );
            ContextStack::MAX_POS
        }
    }

    #[inline(always)]
    fn pop_id(&mut self, pos: u16) {
        if pos == ContextStack::BASE_POS || pos == ContextStack::MAX_POS {
            otel_warn!(
                name: "Context.OutOfOrderDrop",
                position = pos,
                message = "Attempted to pop the base or overflow position"
            );
            return;
        }
        let len = self.stack.len() as u16;
        if pos == len {
            while let Some(None) = self.stack.last() {
                _ = self.stack.pop();
            }
            if let Some(Some(previous)) = self.stack.pop() {
                self.current_cx = previous;
            }
        } else if pos > len {
            otel_warn!(
                name: "Context.PopOutOfBounds",
                position = pos,
                stack_length = len,
                message = "Attempted to pop beyond the end of the context stack"
            );
        } else {
            _ = self.stack[pos as usize].take();
        }
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        ContextStack {
            current_cx: Context::default(),
            stack: Vec::with_capacity(ContextStack::INITIAL_CAPACITY),
            _marker: PhantomData,
        }
    }
}
