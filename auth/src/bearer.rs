/// Extract the token from a `Bearer <token>` credential.
///
/// The scheme is case-insensitive and surrounding whitespace is ignored.
/// Missing, empty or non-bearer values yield `None`: absence is not an error,
/// some callers treat it as an anonymous request.
pub fn parse_bearer(raw_header: Option<&str>) -> Option<&str> {
    let (scheme, token) = raw_header?.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
