use std::time::{Duration, Instant};

use dmp_core::{Config, Diff, Op};

// Upstream references (diff-match-patch test suite):
// - TestDiffCommonPrefix / TestDiffCommonSuffix / TestDiffCommonOverlap
// - TestDiffHalfMatch
// - TestDiffCleanupMerge / TestDiffCleanupSemanticLossless
// - TestDiffCleanupSemantic / TestDiffCleanupEfficiency
// - TestDiff / TestDiffWithTimeout / TestDiffWithCheckLines

fn eq(text: &str) -> Diff {
    Diff::new(Op::Equal, text)
}

fn del(text: &str) -> Diff {
    Diff::new(Op::Delete, text)
}

fn ins(text: &str) -> Diff {
    Diff::new(Op::Insert, text)
}

fn rebuild_texts(diffs: &[Diff]) -> (String, String) {
    let config = Config::new();
    (config.diff_text1(diffs), config.diff_text2(diffs))
}

#[test]
fn upstream_port_diff_common_prefix_suffix_overlap() {
    let config = Config::new();
    assert_eq!(config.diff_common_prefix("abc", "xyz"), 0);
    assert_eq!(config.diff_common_prefix("1234abcdef", "1234xyz"), 4);
    assert_eq!(config.diff_common_prefix("1234", "1234xyz"), 4);

    assert_eq!(config.diff_common_suffix("abc", "xyz"), 0);
    assert_eq!(config.diff_common_suffix("abcdef1234", "xyz1234"), 4);
    assert_eq!(config.diff_common_suffix("1234", "xyz1234"), 4);

    assert_eq!(config.diff_common_overlap("", "abcd"), 0);
    assert_eq!(config.diff_common_overlap("abc", "abcd"), 3);
    assert_eq!(config.diff_common_overlap("123456", "abcd"), 0);
    assert_eq!(config.diff_common_overlap("123456xxx", "xxxabcd"), 3);
    assert_eq!(config.diff_common_overlap("fi", "\u{fb01}i"), 0);
}

#[test]
fn upstream_port_diff_half_match_matrix() {
    let some = |pieces: [&str; 5]| Some(pieces.map(str::to_string));
    let cases: Vec<(&str, &str, Option<[String; 5]>)> = vec![
        ("1234567890", "abcdef", None),
        ("12345", "23", None),
        ("1234567890", "a345678z", some(["12", "90", "a", "z", "345678"])),
        ("a345678z", "1234567890", some(["a", "z", "12", "90", "345678"])),
        ("abc56789z", "1234567890", some(["abc", "z", "1234", "0", "56789"])),
        ("a23456xyz", "1234567890", some(["a", "xyz", "1", "7890", "23456"])),
        (
            "121231234123451234123121",
            "a1234123451234z",
            some(["12123", "123121", "a", "z", "1234123451234"]),
        ),
        (
            "x-=-=-=-=-=-=-=-=-=-=-=-=",
            "xx-=-=-=-=-=-=-=",
            some(["", "-=-=-=-=-=", "x", "", "x-=-=-=-=-=-=-="]),
        ),
        (
            "-=-=-=-=-=-=-=-=-=-=-=-=y",
            "-=-=-=-=-=-=-=yy",
            some(["-=-=-=-=-=", "", "", "y", "-=-=-=-=-=-=-=y"]),
        ),
        // Non-optimal half-match.
        (
            "qHilloHelloHew",
            "xHelloHeHulloy",
            some(["qHillo", "w", "x", "Hulloy", "HelloHe"]),
        ),
    ];
    let config = Config::new();
    for (i, (text1, text2, expected)) in cases.iter().enumerate() {
        assert_eq!(config.diff_half_match(text1, text2), *expected, "case #{i}");
    }
    // Optimal: no half-match when there is no time budget.
    let config = Config {
        diff_timeout: None,
        ..Config::new()
    };
    assert_eq!(config.diff_half_match("qHilloHelloHew", "xHelloHeHulloy"), None);
}

#[test]
fn upstream_port_diff_cleanup_merge_matrix() {
    let cases: Vec<(&str, Vec<Diff>, Vec<Diff>)> = vec![
        ("null case", vec![], vec![]),
        (
            "no diff case",
            vec![eq("a"), del("b"), ins("c")],
            vec![eq("a"), del("b"), ins("c")],
        ),
        (
            "merge equalities",
            vec![eq("a"), eq("b"), eq("c")],
            vec![eq("abc")],
        ),
        (
            "merge deletions",
            vec![del("a"), del("b"), del("c")],
            vec![del("abc")],
        ),
        (
            "merge insertions",
            vec![ins("a"), ins("b"), ins("c")],
            vec![ins("abc")],
        ),
        (
            "merge interweave",
            vec![del("a"), ins("b"), del("c"), ins("d"), eq("e"), eq("f")],
            vec![del("ac"), ins("bd"), eq("ef")],
        ),
        (
            "prefix and suffix detection",
            vec![del("a"), ins("abc"), del("dc")],
            vec![eq("a"), del("d"), ins("b"), eq("c")],
        ),
        (
            "prefix and suffix detection with equalities",
            vec![eq("x"), del("a"), ins("abc"), del("dc"), eq("y")],
            vec![eq("xa"), del("d"), ins("b"), eq("cy")],
        ),
        (
            "multibyte prefix and suffix detection",
            vec![eq("x"), del("\u{0101}"), ins("\u{0101}bc"), del("dc"), eq("y")],
            vec![eq("x\u{0101}"), del("d"), ins("b"), eq("cy")],
        ),
        (
            "slide edit left",
            vec![eq("a"), ins("ba"), eq("c")],
            vec![ins("ab"), eq("ac")],
        ),
        (
            "slide edit right",
            vec![eq("c"), ins("ab"), eq("a")],
            vec![eq("ca"), ins("ba")],
        ),
        (
            "slide edit left recursive",
            vec![eq("a"), del("b"), eq("c"), del("ac"), eq("x")],
            vec![del("abc"), eq("acx")],
        ),
        (
            "slide edit right recursive",
            vec![eq("x"), del("ca"), eq("c"), del("b"), eq("a")],
            vec![eq("xca"), del("cba")],
        ),
    ];
    let config = Config::new();
    for (name, input, expected) in cases {
        assert_eq!(config.diff_cleanup_merge(input), expected, "{name}");
    }
}

#[test]
fn upstream_port_diff_cleanup_semantic_lossless_matrix() {
    let cases: Vec<(&str, Vec<Diff>, Vec<Diff>)> = vec![
        ("null case", vec![], vec![]),
        (
            "blank lines",
            vec![
                eq("AAA\r\n\r\nBBB"),
                ins("\r\nDDD\r\n\r\nBBB"),
                eq("\r\nEEE"),
            ],
            vec![
                eq("AAA\r\n\r\n"),
                ins("BBB\r\nDDD\r\n\r\n"),
                eq("BBB\r\nEEE"),
            ],
        ),
        (
            "line boundaries",
            vec![eq("AAA\r\nBBB"), ins(" DDD\r\nBBB"), eq(" EEE")],
            vec![eq("AAA\r\n"), ins("BBB DDD\r\n"), eq("BBB EEE")],
        ),
        (
            "word boundaries",
            vec![eq("The c"), ins("ow and the c"), eq("at.")],
            vec![eq("The "), ins("cow and the "), eq("cat.")],
        ),
        (
            "alphanumeric boundaries",
            vec![eq("The-c"), ins("ow-and-the-c"), eq("at.")],
            vec![eq("The-"), ins("cow-and-the-"), eq("cat.")],
        ),
        (
            "hitting the start",
            vec![eq("a"), del("a"), eq("ax")],
            vec![del("a"), eq("aax")],
        ),
        (
            "hitting the end",
            vec![eq("xa"), del("a"), eq("a")],
            vec![eq("xaa"), del("a")],
        ),
        (
            "sentence boundaries",
            vec![eq("The xxx. The "), ins("zzz. The "), eq("yyy.")],
            vec![eq("The xxx."), ins(" The zzz."), eq(" The yyy.")],
        ),
        (
            "multibyte sentence boundaries",
            vec![eq("The ♕. The "), ins("♔. The "), eq("♖.")],
            vec![eq("The ♕."), ins(" The ♔."), eq(" The ♖.")],
        ),
        (
            "scalar boundaries hold",
            vec![eq("♕♕"), ins("♔♔"), eq("♖♖")],
            vec![eq("♕♕"), ins("♔♔"), eq("♖♖")],
        ),
    ];
    let config = Config::new();
    for (name, input, expected) in cases {
        assert_eq!(config.diff_cleanup_semantic_lossless(input), expected, "{name}");
    }
}

#[test]
fn upstream_port_diff_cleanup_semantic_matrix() {
    let cases: Vec<(&str, Vec<Diff>, Vec<Diff>)> = vec![
        ("null case", vec![], vec![]),
        (
            "no elimination #1",
            vec![del("ab"), ins("cd"), eq("12"), del("e")],
            vec![del("ab"), ins("cd"), eq("12"), del("e")],
        ),
        (
            "no elimination #2",
            vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")],
            vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")],
        ),
        (
            "no elimination #3",
            vec![
                eq("2016-09-01T03:07:1"),
                ins("5.15"),
                eq("4"),
                del("."),
                eq("80"),
                ins("0"),
                eq("78"),
                del("3074"),
                eq("1Z"),
            ],
            vec![
                eq("2016-09-01T03:07:1"),
                ins("5.15"),
                eq("4"),
                del("."),
                eq("80"),
                ins("0"),
                eq("78"),
                del("3074"),
                eq("1Z"),
            ],
        ),
        (
            "simple elimination",
            vec![del("a"), eq("b"), del("c")],
            vec![del("abc"), ins("b")],
        ),
        (
            "backpass elimination",
            vec![del("ab"), eq("cd"), del("e"), eq("f"), ins("g")],
            vec![del("abcdef"), ins("cdfg")],
        ),
        (
            "multiple eliminations",
            vec![
                ins("1"),
                eq("A"),
                del("B"),
                ins("2"),
                eq("_"),
                ins("1"),
                eq("A"),
                del("B"),
                ins("2"),
            ],
            vec![del("AB_AB"), ins("1A2_1A2")],
        ),
        (
            "word boundaries",
            vec![eq("The c"), del("ow and the c"), eq("at.")],
            vec![eq("The "), del("cow and the "), eq("cat.")],
        ),
        (
            "no overlap elimination",
            vec![del("abcxx"), ins("xxdef")],
            vec![del("abcxx"), ins("xxdef")],
        ),
        (
            "overlap elimination",
            vec![del("abcxxx"), ins("xxxdef")],
            vec![del("abc"), eq("xxx"), ins("def")],
        ),
        (
            "reverse overlap elimination",
            vec![del("xxxabc"), ins("defxxx")],
            vec![ins("def"), eq("xxx"), del("abc")],
        ),
        (
            "two overlap eliminations",
            vec![
                del("abcd1212"),
                ins("1212efghi"),
                eq("----"),
                del("A3"),
                ins("3BC"),
            ],
            vec![
                del("abcd"),
                eq("1212"),
                ins("efghi"),
                eq("----"),
                del("A"),
                eq("3"),
                ins("BC"),
            ],
        ),
        (
            "signing-news regression",
            vec![
                eq("James McCarthy "),
                del("close to "),
                eq("sign"),
                del("ing"),
                ins("s"),
                eq(" new "),
                del("E"),
                ins("fi"),
                eq("ve"),
                ins("-yea"),
                eq("r"),
                del("ton"),
                eq(" deal"),
                ins(" at Everton"),
            ],
            vec![
                eq("James McCarthy "),
                del("close to "),
                eq("sign"),
                del("ing"),
                ins("s"),
                eq(" new "),
                ins("five-year deal at "),
                eq("Everton"),
                del(" deal"),
            ],
        ),
        (
            "cjk replacement run",
            vec![
                ins("星球大戰：新的希望 "),
                eq("star wars: "),
                del("episodio iv - un"),
                eq("a n"),
                del("u"),
                eq("e"),
                del("va"),
                ins("w"),
                eq(" "),
                del("es"),
                ins("ho"),
                eq("pe"),
                del("ranza"),
            ],
            vec![
                ins("星球大戰：新的希望 "),
                eq("star wars: "),
                del("episodio iv - una nueva esperanza"),
                ins("a new hope"),
            ],
        ),
        (
            "hangul no-op",
            vec![ins("킬러 인 "), eq("리커버리"), del(" 보이즈")],
            vec![ins("킬러 인 "), eq("리커버리"), del(" 보이즈")],
        ),
    ];
    let config = Config::new();
    for (name, input, expected) in cases {
        assert_eq!(config.diff_cleanup_semantic(input), expected, "{name}");
    }
}

#[test]
fn upstream_port_diff_cleanup_efficiency_matrix() {
    let cases: Vec<(&str, usize, Vec<Diff>, Vec<Diff>)> = vec![
        ("null case", 4, vec![], vec![]),
        (
            "no elimination",
            4,
            vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")],
            vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")],
        ),
        (
            "four-edit elimination",
            4,
            vec![del("ab"), ins("12"), eq("xyz"), del("cd"), ins("34")],
            vec![del("abxyzcd"), ins("12xyz34")],
        ),
        (
            "three-edit elimination",
            4,
            vec![ins("12"), eq("x"), del("cd"), ins("34")],
            vec![del("xcd"), ins("12x34")],
        ),
        (
            "backpass elimination",
            4,
            vec![
                del("ab"),
                ins("12"),
                eq("xy"),
                ins("34"),
                eq("z"),
                del("cd"),
                ins("56"),
            ],
            vec![del("abxyzcd"), ins("12xy34z56")],
        ),
        (
            "high cost elimination",
            5,
            vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")],
            vec![del("abwxyzcd"), ins("12wxyz34")],
        ),
    ];
    for (name, edit_cost, input, expected) in cases {
        let config = Config {
            diff_edit_cost: edit_cost,
            ..Config::new()
        };
        assert_eq!(config.diff_cleanup_efficiency(input), expected, "{name}");
    }
}

#[test]
fn upstream_port_diff_main_matrix() {
    let second = Some(Duration::from_secs(1));
    let cases: Vec<(&str, &str, Option<Duration>, Vec<Diff>)> = vec![
        ("", "", second, vec![]),
        ("abc", "abc", second, vec![eq("abc")]),
        ("abc", "ab123c", second, vec![eq("ab"), ins("123"), eq("c")]),
        ("a123bc", "abc", second, vec![eq("a"), del("123"), eq("bc")]),
        (
            "abc",
            "a123b456c",
            second,
            vec![eq("a"), ins("123"), eq("b"), ins("456"), eq("c")],
        ),
        (
            "a123b456c",
            "abc",
            second,
            vec![eq("a"), del("123"), eq("b"), del("456"), eq("c")],
        ),
        // Real diffs with the timeout switched off.
        ("a", "b", None, vec![del("a"), ins("b")]),
        (
            "Apples are a fruit.",
            "Bananas are also fruit.",
            None,
            vec![
                del("Apple"),
                ins("Banana"),
                eq("s are a"),
                ins("lso"),
                eq(" fruit."),
            ],
        ),
        (
            "ax\t",
            "\u{0680}x\u{0000}",
            None,
            vec![
                del("a"),
                ins("\u{0680}"),
                eq("x"),
                del("\t"),
                ins("\u{0000}"),
            ],
        ),
        (
            "1ayb2",
            "abxab",
            None,
            vec![del("1"), eq("a"), del("y"), eq("b"), del("2"), ins("xab")],
        ),
        (
            "abcy",
            "xaxcxabc",
            None,
            vec![ins("xaxcx"), eq("abc"), del("y")],
        ),
        (
            "ABCDa=bcd=efghijklmnopqrsEFGHIJKLMNOefg",
            "a-bcd-efghijklmnopqrs",
            None,
            vec![
                del("ABCD"),
                eq("a"),
                del("="),
                ins("-"),
                eq("bcd"),
                del("="),
                ins("-"),
                eq("efghijklmnopqrs"),
                del("EFGHIJKLMNOefg"),
            ],
        ),
        (
            "a [[Pennsylvania]] and [[New",
            " and [[Pennsylvania]]",
            None,
            vec![
                ins(" "),
                eq("a"),
                ins("nd"),
                eq(" [[Pennsylvania]]"),
                del(" and [[New"),
            ],
        ),
    ];
    for (i, (text1, text2, timeout, expected)) in cases.into_iter().enumerate() {
        let config = Config {
            diff_timeout: timeout,
            ..Config::new()
        };
        assert_eq!(config.diff_main(text1, text2, false), expected, "case #{i}");
    }
}

#[test]
fn upstream_port_diff_respects_timeout_and_stays_valid() {
    let config = Config {
        diff_timeout: Some(Duration::from_millis(100)),
        ..Config::new()
    };
    let mut a = "`Twas brillig, and the slithy toves\nDid gyre and gimble in the wabe:\nAll mimsy were the borogoves,\nAnd the mome raths outgrabe.\n".to_string();
    let mut b = "I am the very model of a modern major general,\nI've information vegetable, animal, and mineral,\nI know the kings of England, and I quote the fights historical,\nFrom Marathon to Waterloo, in order categorical.\n".to_string();
    // Grow the texts until a timeout is guaranteed.
    for _ in 0..10 {
        a = format!("{a}{a}");
        b = format!("{b}{b}");
    }
    let started = Instant::now();
    let diffs = config.diff_main(&a, &b, true);
    let elapsed = started.elapsed();
    // Took at least the budget, but not forever (be very forgiving).
    let timeout = config.diff_timeout.unwrap();
    assert!(elapsed >= timeout, "{elapsed:?} < {timeout:?}");
    assert!(elapsed < timeout * 100, "{elapsed:?} >= {:?}", timeout * 100);
    // The result is coarse, never invalid.
    let (text1, text2) = rebuild_texts(&diffs);
    assert_eq!(text1, a);
    assert_eq!(text2, b);
}

#[test]
fn upstream_port_diff_with_checklines() {
    let cases = [
        (
            "1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n",
            "abcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\nabcdefghij\n",
        ),
        (
            "1234567890123456789012345678901234567890123456789012345678901234567890123456789012345678901234567890123456789012345678901234567890",
            "abcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghijabcdefghij",
        ),
        (
            "1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n1234567890\n",
            "abcdefghij\n1234567890\n1234567890\n1234567890\nabcdefghij\n1234567890\n1234567890\n1234567890\nabcdefghij\n1234567890\n1234567890\n1234567890\nabcdefghij\n",
        ),
    ];
    let config = Config {
        diff_timeout: None,
        ..Config::new()
    };
    for (i, (text1, text2)) in cases.iter().enumerate() {
        let without = config.diff_main(text1, text2, false);
        let with = config.diff_main(text1, text2, true);
        // Line mode trades minimality for speed, so only the rebuilt texts
        // are guaranteed to agree on the mixed-content case.
        if i != 2 {
            assert_eq!(without, with, "case #{i}");
        }
        assert_eq!(rebuild_texts(&without), rebuild_texts(&with), "case #{i}");
        let (t1, t2) = rebuild_texts(&with);
        assert_eq!(&t1, text1, "case #{i}");
        assert_eq!(&t2, text2, "case #{i}");
    }
}
