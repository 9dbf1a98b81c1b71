/// Marker in the plugin configuration template that stands for the node's pod CIDR.
pub const SUBNET_PLACEHOLDER: &str = "{{SUBNET}}";

/// Replaces every [`SUBNET_PLACEHOLDER`] in `template` with `cidr`.
///
/// The substitution is a single literal pass: whatever `cidr` contains is
/// copied verbatim and never scanned again.
pub fn render(template: &str, cidr: &str) -> String {
    template.replace(SUBNET_PLACEHOLDER, cidr)
}

/// Number of non-overlapping placeholders in `template`.
pub fn occurrences(template: &str) -> usize {
    template.matches(SUBNET_PLACEHOLDER).count()
}
