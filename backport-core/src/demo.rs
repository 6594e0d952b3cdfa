use backport_remote::PatchInstruction;

/// Patch used when the service is unavailable and the user opts into the
/// demonstration path, or when `--demo` is requested up front.
pub fn demo_instruction() -> PatchInstruction {
    PatchInstruction {
        file_path: "README.md".to_string(),
        start_line: 1,
        end_line: 1,
        patch_text: "<!-- backport demonstration patch -->".to_string(),
    }
}
