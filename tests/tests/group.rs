//! Group scenarios.

use sqllike_tests::prelude::*;

mod aggregates {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("aggregates")
            .fixture("persons.json")
            .step(
                "len_and_avg_by_gender",
                |f| {
                    let persons = f.stream("persons")?;
                    let gender = persons.column("gender")?;
                    let nom = persons.column("nom")?;
                    let age = persons.column("age")?;
                    Ok(persons.group(
                        &[gender],
                        &[("len_nom", nom.len()?), ("avg_age", age.avg()?)],
                    )?)
                },
                |a| {
                    a.columns(&["gender", "len_nom", "avg_age"])
                        .returns(vec![
                            row! { gender: "F", len_nom: 1, avg_age: 2.0 },
                            row! { gender: "M", len_nom: 2, avg_age: 25.0 },
                        ])
                        .ordered()
                },
            )
            .step(
                "two_keys",
                |f| {
                    let persons = f.stream("persons")?;
                    let keys = persons.columns(&["gender", "nom"])?;
                    let age = persons.column("age")?;
                    Ok(persons.group(&keys, &[("nbs", age.len()?)])?)
                },
                |a| {
                    a.columns(&["gender", "nom", "nbs"])
                        .returns(vec![
                            row! { nbs: 1, gender: "F", nom: "jeanne" },
                            row! { nbs: 1, gender: "M", nom: "j" },
                            row! { nbs: 1, gender: "M", nom: "jean" },
                        ])
                        .ordered()
                },
            )
            .step(
                "sum_min_max",
                |f| {
                    let persons = f.stream("persons")?;
                    let gender = persons.column("gender")?;
                    let age = persons.column("age")?;
                    Ok(persons.group(
                        &[gender],
                        &[
                            ("total", age.sum()?),
                            ("youngest", age.min()?),
                            ("oldest", age.max()?),
                        ],
                    )?)
                },
                |a| {
                    a.returns(vec![
                        row! { gender: "F", total: 2, youngest: 2, oldest: 2 },
                        row! { gender: "M", total: 50, youngest: 10, oldest: 40 },
                    ])
                    .ordered()
                },
            )
            .step(
                "no_keys_is_one_group",
                |f| {
                    let persons = f.stream("persons")?;
                    let nom = persons.column("nom")?;
                    Ok(persons.group(&[], &[("count", nom.count()?)])?)
                },
                |a| a.returns(vec![row! { count: 3 }]),
            )
            .step(
                "filter_on_aggregate",
                |f| {
                    let persons = f.stream("persons")?;
                    let gender = persons.column("gender")?;
                    let age = persons.column("age")?;
                    let grouped = persons.group(&[gender], &[("avg_age", age.avg()?)])?;
                    let avg_age = grouped.column("avg_age")?;
                    Ok(grouped.filter(&avg_age.gt(10)?)?)
                },
                |a| a.returns(vec![row! { gender: "M", avg_age: 25.0 }]),
            )
    }

    #[test]
    fn test_aggregates() {
        scenario().run().unwrap();
    }
}

mod misuse {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("misuse")
            .fixture("persons.json")
            .step(
                "composed_aggregate",
                |f| {
                    let persons = f.stream("persons")?;
                    let gender = persons.column("gender")?;
                    let nom = persons.column("nom")?;
                    let age = persons.column("age")?;
                    Ok(persons.group(
                        &[gender],
                        &[("len_nom", nom.len()?.mul(2)?), ("avg_age", age.avg()?)],
                    )?)
                },
                |a| a.error("operation not allowed"),
            )
            .step(
                "aggregate_in_projection",
                |f| {
                    let persons = f.stream("persons")?;
                    let age = persons.column("age")?;
                    Ok(persons.project(&[], &[("avg_age", age.avg()?)])?)
                },
                |a| a.error_matches(r"^operation not allowed: .+"),
            )
            .step(
                "arithmetic_on_group_result",
                |f| {
                    let persons = f.stream("persons")?;
                    let gender = persons.column("gender")?;
                    let age = persons.column("age")?;
                    let grouped = persons.group(&[gender], &[("avg_age", age.avg()?)])?;
                    let avg_age = grouped.column("avg_age")?;
                    Ok(grouped.project(&[], &[("twice", avg_age.mul(2)?)])?)
                },
                |a| a.error("aggregate column 'avg_age' cannot be combined with '*'"),
            )
            .step(
                "expression_key",
                |f| {
                    let persons = f.stream("persons")?;
                    let age = persons.column("age")?;
                    Ok(persons.group(&[age.gt(18)?], &[("n", age.len()?)])?)
                },
                |a| a.error_matches(r"schema mismatch: column '\w+' does not belong to stream s\d+"),
            )
    }

    #[test]
    fn test_misuse() {
        scenario().run().unwrap();
    }
}
