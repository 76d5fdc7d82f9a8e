use pivotlab_solver::{Model, Relation, Sense, SignRestriction};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty input")]
    EmptyInput,
    #[error("line 1 must start with `max` or `min`, found `{0}`")]
    BadSense(String),
    #[error("line 1 needs at least one objective coefficient")]
    MissingObjective,
    #[error("invalid number `{token}` on line {line}")]
    BadNumber { line: usize, token: String },
    #[error("line {line} has {found} coefficients, expected {expected}")]
    WrongArity {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("constraint on line {line} is missing a relation")]
    MissingRelation { line: usize },
    #[error("constraint on line {line} needs exactly one right-hand side")]
    BadRhs { line: usize },
    #[error("invalid sign token `{token}` on the last line")]
    BadSign { token: String },
    #[error("at least one constraint line is required")]
    MissingConstraints,
    #[error("{0}")]
    Invalid(String),
}

/// Insert spaces around relation tokens so a glued `2<=18` splits, and
/// normalize the Unicode minus the course material uses.
fn normalize(line: &str) -> String {
    line.replace('\u{2212}', "-")
        .replace("<=", " <= ")
        .replace(">=", " >= ")
        // A bare `=` only; the padded forms above already isolated
        // their own `=`.
        .replace('=', " = ")
        .replace("< =", "<=")
        .replace("> =", ">=")
}

fn parse_number(token: &str, line: usize) -> Result<f64, ParseError> {
    token.parse::<f64>().map_err(|_| ParseError::BadNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_relation(token: &str) -> Option<Relation> {
    match token {
        "<=" => Some(Relation::Le),
        ">=" => Some(Relation::Ge),
        "=" => Some(Relation::Eq),
        _ => None,
    }
}

fn parse_sign(token: &str) -> Result<SignRestriction, ParseError> {
    match token {
        "+" => Ok(SignRestriction::NonNegative),
        "-" => Ok(SignRestriction::NonPositive),
        "urs" => Ok(SignRestriction::Unrestricted),
        "int" => Ok(SignRestriction::Integer),
        "bin" => Ok(SignRestriction::Binary),
        other => Err(ParseError::BadSign {
            token: other.to_string(),
        }),
    }
}

/// Parse the compact model format.
pub fn parse_model(source: &str) -> Result<Model, ParseError> {
    let lines: Vec<(usize, String)> = source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, normalize(line)))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let [(first_no, first), middle @ .., (last_no, last)] = lines.as_slice() else {
        return Err(if lines.is_empty() {
            ParseError::EmptyInput
        } else {
            ParseError::MissingConstraints
        });
    };

    // Line 1: sense + objective.
    let mut tokens = first.split_whitespace();
    let sense = match tokens.next() {
        Some("max") => Sense::Max,
        Some("min") => Sense::Min,
        Some(other) => return Err(ParseError::BadSense(other.to_string())),
        None => return Err(ParseError::BadSense(String::new())),
    };
    let objective: Vec<f64> = tokens
        .map(|t| parse_number(t, *first_no))
        .collect::<Result<_, _>>()?;
    if objective.is_empty() {
        return Err(ParseError::MissingObjective);
    }
    let n = objective.len();

    // Last line: sign restrictions.
    let signs: Vec<SignRestriction> = last
        .split_whitespace()
        .map(parse_sign)
        .collect::<Result<_, _>>()?;
    if signs.len() != n {
        return Err(ParseError::WrongArity {
            line: *last_no,
            expected: n,
            found: signs.len(),
        });
    }

    if middle.is_empty() {
        return Err(ParseError::MissingConstraints);
    }

    let mut model = Model::with_default_labels(sense, objective, signs)
        .map_err(|e| ParseError::Invalid(e.to_string()))?;

    // Middle lines: coefficients, relation, right-hand side.
    for (line_no, line) in middle {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let relation_pos = tokens
            .iter()
            .position(|t| parse_relation(t).is_some())
            .ok_or(ParseError::MissingRelation { line: *line_no })?;
        let relation = parse_relation(tokens[relation_pos]).expect("position matched");

        let coefficients: Vec<f64> = tokens[..relation_pos]
            .iter()
            .map(|t| parse_number(t, *line_no))
            .collect::<Result<_, _>>()?;
        if coefficients.len() != n {
            return Err(ParseError::WrongArity {
                line: *line_no,
                expected: n,
                found: coefficients.len(),
            });
        }

        let rhs_tokens = &tokens[relation_pos + 1..];
        if rhs_tokens.len() != 1 {
            return Err(ParseError::BadRhs { line: *line_no });
        }
        let rhs = parse_number(rhs_tokens[0], *line_no)?;

        model
            .add_constraint(coefficients, relation, rhs)
            .map_err(|e| ParseError::Invalid(e.to_string()))?;
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_production_model() {
        let source = "max +3 +5\n1 0 <= 4\n0 2 <= 12\n3 2 <= 18\n+ +\n";
        let model = parse_model(source).unwrap();
        assert_eq!(model.sense, Sense::Max);
        assert_eq!(model.objective, vec![3.0, 5.0]);
        assert_eq!(model.num_constraints(), 3);
        assert_eq!(model.constraints[2].coefficients, vec![3.0, 2.0]);
        assert_eq!(model.constraints[2].relation, Relation::Le);
        assert_eq!(model.constraints[2].rhs, 18.0);
        assert_eq!(model.signs, vec![SignRestriction::NonNegative; 2]);
        assert_eq!(model.labels, vec!["X1", "X2"]);
    }

    #[test]
    fn splits_a_glued_relation() {
        let source = "max +3 +5\n3 2<=18\n+ +\n";
        let model = parse_model(source).unwrap();
        assert_eq!(model.constraints[0].coefficients, vec![3.0, 2.0]);
        assert_eq!(model.constraints[0].rhs, 18.0);
    }

    #[test]
    fn accepts_unicode_minus_and_all_relations() {
        let source = "min +4 \u{2212}1\n3 1 = 3\n4 3 >= 6\n1 2 <= 4\n+ urs\n";
        let model = parse_model(source).unwrap();
        assert_eq!(model.objective, vec![4.0, -1.0]);
        assert_eq!(model.constraints[0].relation, Relation::Eq);
        assert_eq!(model.constraints[1].relation, Relation::Ge);
        assert_eq!(model.signs[1], SignRestriction::Unrestricted);
    }

    #[test]
    fn parses_integer_and_binary_signs() {
        let source = "max +2 +3\n1 1 <= 5\n2 1 <= 8\n+ bin\n";
        let model = parse_model(source).unwrap();
        assert_eq!(
            model.signs,
            vec![SignRestriction::NonNegative, SignRestriction::Binary]
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        let source = "\nmax +1\n\n1 <= 2\n\n+\n\n";
        let model = parse_model(source).unwrap();
        assert_eq!(model.num_constraints(), 1);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_model(""), Err(ParseError::EmptyInput));
        assert_eq!(
            parse_model("maximize +1\n1 <= 2\n+\n"),
            Err(ParseError::BadSense("maximize".to_string()))
        );
        assert!(matches!(
            parse_model("max +1 +2\n1 <= 2\n+ +\n"),
            Err(ParseError::WrongArity { .. })
        ));
        assert!(matches!(
            parse_model("max +1\n1 2\n+\n"),
            Err(ParseError::MissingRelation { .. })
        ));
        assert!(matches!(
            parse_model("max +1\n1 <= 2 3\n+\n"),
            Err(ParseError::BadRhs { .. })
        ));
        assert!(matches!(
            parse_model("max +1\n1 <= 2\n0\n"),
            Err(ParseError::BadSign { .. })
        ));
        assert!(matches!(
            parse_model("max +one\n1 <= 2\n+\n"),
            Err(ParseError::BadNumber { .. })
        ));
        assert_eq!(
            parse_model("max +1\n+\n"),
            Err(ParseError::MissingConstraints)
        );
    }
}
