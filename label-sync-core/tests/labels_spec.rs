use label_sync_core::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use speculate2::speculate;

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

speculate! {
    describe "build_catalog" {
        it "returns an empty catalog" {
            assert!(build_catalog(&[], &[]).is_empty());
        }

        it "returns all flags" {
            let flags = vec![FlagLabel::new("foo"), FlagLabel::new("bar")];
            assert_eq!(build_catalog(&flags, &[]), vec!["foo", "bar"]);
        }

        it "returns all states" {
            let bin = StateValue::new("bin");
            let states = vec![
                StateLabel::new("foo").value(bin.clone()),
                StateLabel::new("bar").value(bin),
            ];
            assert_eq!(build_catalog(&[], &states), vec!["foo/bin", "bar/bin"]);
        }
    }

    describe "priority_sort" {
        it "sorts by priority" {
            let high = FlagLabel::new("high").priority(5);
            let low = FlagLabel::new("low").priority(1);

            let sorted = priority_sort(vec![low, high.clone()]);
            assert_eq!(sorted[0], high);
        }

        it "sorts by name when priority is equal" {
            let first = FlagLabel::new("label-a").priority(1);
            let second = FlagLabel::new("label-b").priority(1);

            let sorted = priority_sort(vec![second, first.clone()]);
            assert_eq!(sorted[0], first);
        }

        it "puts higher priority first regardless of name" {
            let sorted = priority_sort(vec![
                StateValue::new("a").priority(1),
                StateValue::new("z").priority(2),
                StateValue::new("m").priority(1),
            ]);
            let names: Vec<&str> = sorted.iter().map(|v| v.base.name.as_str()).collect();
            assert_eq!(names, vec!["z", "a", "m"]);
        }

        it "accepts negative priorities" {
            let sorted = priority_sort(vec![
                FlagLabel::new("below").priority(-1),
                FlagLabel::new("default"),
            ]);
            assert_eq!(sorted[0].base.name, "default");
        }
    }

    describe "resolve_color" {
        it "returns the value color" {
            let state = StateLabel::new("").color("beans");
            let value = StateValue::new("").color("not");

            let color = resolve_color(&palette(&["test"]), || 0.1, &[&value.base, &state.base]);
            assert_eq!(color, "not");
        }

        it "returns the state color when value color is unset" {
            let state = StateLabel::new("").color("beans");
            let value = StateValue::new("").color("");

            let color = resolve_color(&palette(&["test"]), || 0.1, &[&value.base, &state.base]);
            assert_eq!(color, "beans");
        }

        it "returns the flag color" {
            let flag = FlagLabel::new("").color("not");
            assert_eq!(resolve_color(&palette(&["test"]), || 0.1, &[&flag.base]), "not");
        }

        it "returns a palette color when the flag color is unset" {
            let flag = FlagLabel::new("");
            let mut rng = StdRng::seed_from_u64(7);

            let color = resolve_color(&palette(&["test"]), || rng.gen::<f64>(), &[&flag.base]);
            assert_eq!(color, "test");
        }

        it "picks the same fallback colors for the same seed" {
            let colors = palette(&["a", "b", "c", "d", "e", "f"]);
            let flags: Vec<FlagLabel> = (0..12).map(|i| FlagLabel::new(format!("flag-{i}"))).collect();

            let pick = |seed: u64| {
                let mut rng = StdRng::seed_from_u64(seed);
                flags
                    .iter()
                    .map(|f| resolve_color(&colors, || rng.gen::<f64>(), &[&f.base]))
                    .collect::<Vec<_>>()
            };

            assert_eq!(pick(42), pick(42));
        }
    }
}
