use blimp_internal::command::{
    parse_line, Command, CommandParser, ElevatorDirection, ParseError, RudderDirection,
    ThrottleDirection, LINE_BUFFER_SIZE,
};

#[test]
pub fn parses_every_command() {
    assert_eq!(parse_line(b"h"), Ok(Command::Hail));
    assert_eq!(parse_line(b"s"), Ok(Command::Status));
    assert_eq!(
        parse_line(b"e u 45"),
        Ok(Command::Elevators {
            direction: ElevatorDirection::Up,
            deflection: 45
        })
    );
    assert_eq!(
        parse_line(b"r l 30"),
        Ok(Command::Rudder {
            direction: RudderDirection::Left,
            deflection: 30
        })
    );
    assert_eq!(
        parse_line(b"t r 100"),
        Ok(Command::Throttle {
            direction: ThrottleDirection::Reverse,
            speed: 100
        })
    );
    assert_eq!(parse_line(b"i b"), Ok(Command::Instruments { id: 'b' }));
    assert_eq!(parse_line(b"a 1"), Ok(Command::Autopilot { mode: '1' }));
}

#[test]
pub fn spaces_are_optional() {
    assert_eq!(parse_line(b"ed10"), parse_line(b"e d 10"));
    assert_eq!(parse_line(b"  a2  "), Ok(Command::Autopilot { mode: '2' }));
}

#[test]
pub fn numbers_saturate() {
    assert_eq!(
        parse_line(b"t f 999"),
        Ok(Command::Throttle {
            direction: ThrottleDirection::Forward,
            speed: 255
        })
    );
}

#[test]
pub fn rejects_malformed_lines() {
    assert_eq!(parse_line(b""), Err(ParseError::Empty));
    assert_eq!(parse_line(b"x"), Err(ParseError::UnknownCommand));
    assert_eq!(parse_line(b"H"), Err(ParseError::UnknownCommand));
    assert_eq!(parse_line(b"e"), Err(ParseError::MissingDirection));
    assert_eq!(parse_line(b"r x 4"), Err(ParseError::InvalidDirection));
    assert_eq!(parse_line(b"t f"), Err(ParseError::MissingValue));
    assert_eq!(parse_line(b"i"), Err(ParseError::MissingId));
    assert_eq!(parse_line(b"h 1"), Err(ParseError::TrailingInput));
}

#[test]
pub fn display_matches_wire_form() {
    let commands = [
        Command::Hail,
        Command::Elevators {
            direction: ElevatorDirection::Down,
            deflection: 90,
        },
        Command::Throttle {
            direction: ThrottleDirection::Forward,
            speed: 100,
        },
        Command::Instruments { id: 'c' },
    ];
    let wire = ["h", "e d 90", "t f 100", "i c"];
    for (command, wire) in commands.iter().zip(wire) {
        assert_eq!(command.to_string(), wire);
        assert_eq!(parse_line(wire.as_bytes()), Ok(*command));
    }
}

fn feed(parser: &mut CommandParser, bytes: &[u8]) -> Vec<Result<Command, ParseError>> {
    bytes.iter().filter_map(|b| parser.push(*b)).collect()
}

#[test]
pub fn parser_splits_lines() {
    let mut parser = CommandParser::new();
    let results = feed(&mut parser, b"h\r\n\ns\na 0\n");
    assert_eq!(
        results,
        vec![
            Ok(Command::Hail),
            Ok(Command::Status),
            Ok(Command::Autopilot { mode: '0' })
        ]
    );
    assert!(feed(&mut parser, b"t f 5").is_empty());
}

#[test]
pub fn parser_discards_long_lines() {
    let mut parser = CommandParser::new();
    let long = vec![b'h'; LINE_BUFFER_SIZE + 4];
    assert!(feed(&mut parser, &long).is_empty());
    assert_eq!(parser.push(b'\n'), Some(Err(ParseError::Overflow)));
    assert_eq!(feed(&mut parser, b"h\n"), vec![Ok(Command::Hail)]);
}
