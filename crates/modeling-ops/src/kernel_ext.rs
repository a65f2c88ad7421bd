use enclosure_kernel::{Kernel, KernelIntrospect};

/// A kernel that can both build solids and answer questions about them.
///
/// Operations take `&mut dyn KernelBundle` so they can run a kernel call and
/// inspect its output through the same reference.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
