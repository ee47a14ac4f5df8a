pub mod alloc;
pub mod driver;
pub mod perf;


// Unit tests assert on allocation counts, so the test binary counts too.
#[cfg(test)]
#[global_allocator]
static TEST_ALLOCATOR: alloc::CountingAllocator = alloc::CountingAllocator::new();
