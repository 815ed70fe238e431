pub(crate) const SAMPLE_SOURCE: &str = r#"public class Main {
    public static void main(String[] args) {
        System.out.println("Java execution is not yet implemented.");
        System.out.println("Java requires a JVM which cannot run in browser.");
    }
}"#;

/// Shown instead of running Java; no backend is ever invoked
pub const NOT_IMPLEMENTED_MESSAGE: &str = "[JAVA – NOT IMPLEMENTED]
Java execution requires a JVM or WASM-compiled JDK.
This prototype focuses on JS, Python, and C++ real execution.

Architectural note:
In a full system, Java would run in an isolated JVM instance
or be compiled to WebAssembly with containerized execution
and resource constraints (CPU, memory, I/O) enforced.";
