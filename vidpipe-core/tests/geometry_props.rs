// vidpipe-core/tests/geometry_props.rs
//
// Every named position must keep the overlay inside the frame, whatever the
// frame and overlay sizes.

use proptest::prelude::*;
use std::collections::HashMap;
use vidpipe_core::geometry::{Axes, Position};

/// Evaluates the arithmetic subset used by position expressions:
/// integers, symbols, `+ - * /` and parentheses.
struct Eval<'a> {
    tokens: Vec<String>,
    pos: usize,
    vars: &'a HashMap<&'a str, i64>,
}

impl<'a> Eval<'a> {
    fn run(expr: &str, vars: &'a HashMap<&'a str, i64>) -> i64 {
        let mut tokens = Vec::new();
        let mut current = String::new();
        for c in expr.chars() {
            if "+-*/()".contains(c) {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            } else if !c.is_whitespace() {
                current.push(c);
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        let mut eval = Eval { tokens, pos: 0, vars };
        let value = eval.sum();
        assert_eq!(eval.pos, eval.tokens.len(), "trailing tokens in {expr}");
        value
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> String {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn sum(&mut self) -> i64 {
        let mut value = self.product();
        while let Some(op @ ("+" | "-")) = self.peek() {
            let add = op == "+";
            self.pos += 1;
            let rhs = self.product();
            value = if add { value + rhs } else { value - rhs };
        }
        value
    }

    fn product(&mut self) -> i64 {
        let mut value = self.atom();
        while let Some(op @ ("*" | "/")) = self.peek() {
            let mul = op == "*";
            self.pos += 1;
            let rhs = self.atom();
            value = if mul { value * rhs } else { value / rhs };
        }
        value
    }

    fn atom(&mut self) -> i64 {
        let token = self.next();
        match token.as_str() {
            "(" => {
                let value = self.sum();
                assert_eq!(self.next(), ")");
                value
            }
            "-" => -self.atom(),
            t => t
                .parse()
                .unwrap_or_else(|_| *self.vars.get(t).unwrap_or_else(|| panic!("unknown symbol {t}"))),
        }
    }
}

fn assert_contained(axes: Axes, names: [&str; 4], outer: (i64, i64), inner: (i64, i64)) {
    let vars: HashMap<&str, i64> = names.into_iter().zip([outer.0, outer.1, inner.0, inner.1]).collect();
    for position in Position::ALL {
        let placement = axes.resolve(position);
        let x = Eval::run(&placement.x, &vars);
        let y = Eval::run(&placement.y, &vars);
        assert!(
            x >= 0 && x + inner.0 <= outer.0,
            "{position}: x={x} for {outer:?}/{inner:?}"
        );
        assert!(y >= 0 && y + inner.1 <= outer.1, "{position}: y={y} for {outer:?}/{inner:?}");
    }
}

fn frame_and_layer() -> impl Strategy<Value = ((i64, i64), (i64, i64))> {
    (1i64..4000, 1i64..4000).prop_flat_map(|(w, h)| ((Just(w), Just(h)), (1..=w, 1..=h)))
}

proptest! {
    #[test]
    fn overlay_positions_stay_inside((outer, inner) in frame_and_layer()) {
        assert_contained(Axes::overlay(), ["W", "H", "w", "h"], outer, inner);
    }

    #[test]
    fn watermark_positions_stay_inside((outer, inner) in frame_and_layer()) {
        assert_contained(
            Axes::watermark(),
            ["main_w", "main_h", "overlay_w", "overlay_h"],
            outer,
            inner,
        );
    }

    #[test]
    fn pad_positions_stay_inside((outer, inner) in frame_and_layer()) {
        assert_contained(Axes::pad(), ["ow", "oh", "iw", "ih"], outer, inner);
    }

    #[test]
    fn text_positions_respect_the_margin(
        (outer, inner) in (40i64..4000, 40i64..4000)
            .prop_flat_map(|(w, h)| ((Just(w), Just(h)), (1..=w - 20, 1..=h - 20)))
    ) {
        let vars: HashMap<&str, i64> = ["w", "h", "text_w", "text_h"]
            .into_iter()
            .zip([outer.0, outer.1, inner.0, inner.1])
            .collect();
        for position in Position::ALL {
            let placement = Axes::drawtext().resolve(position);
            let x = Eval::run(&placement.x, &vars);
            let y = Eval::run(&placement.y, &vars);
            prop_assert!(x >= 0 && x + inner.0 <= outer.0, "{} x={}", position, x);
            prop_assert!(y >= 0 && y + inner.1 <= outer.1, "{} y={}", position, y);
            if position == Position::TopLeft {
                prop_assert_eq!((x, y), (10, 10));
            }
            if position == Position::BottomRight {
                prop_assert_eq!((x + inner.0, y + inner.1), (outer.0 - 10, outer.1 - 10));
            }
        }
    }
}
