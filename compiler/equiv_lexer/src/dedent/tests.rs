use super::dedent;
use pretty_assertions::assert_eq;

#[test]
fn removes_shared_margin() {
    let src = "    def f(x):\n        return x\n";
    assert_eq!(dedent(src), "def f(x):\n    return x\n");
}

#[test]
fn blank_lines_do_not_count() {
    let src = "  a = 1\n\n      \n  b = 2";
    assert_eq!(dedent(src), "a = 1\n\n\nb = 2");
}

#[test]
fn mixed_margins_keep_common_part() {
    let src = "\t  x\n\ty\n";
    assert_eq!(dedent(src), "  x\ny\n");
}

#[test]
fn unindented_source_is_unchanged() {
    let src = "def f():\n    pass\n";
    assert_eq!(dedent(src), src);
}

#[test]
fn crlf_line_endings_survive() {
    assert_eq!(dedent("  a\r\n  b\r\n"), "a\r\nb\r\n");
}
