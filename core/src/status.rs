//! HTTP status taxonomy.
//!
//! # Design
//! Two closed tables: [`SuccessStatus`] for 1xx/2xx/3xx and [`ErrorStatus`]
//! for 4xx/5xx plus the non-standard codes used by nginx and CDNs.
//! [`StatusClass`] is the tagged union of the two and [`StatusClass::classify`]
//! is a pure function from a numeric code to it.
//!
//! Codes in 100..=399 that are missing from the success table fall back to
//! [`SuccessStatus::Ok`]. Any other unknown code is rejected.

use std::fmt;

use crate::error::Error;

/// Informational, success and redirection statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuccessStatus {
    Continue,
    SwitchingProtocols,
    Processing,
    EarlyHints,
    Ok,
    Created,
    Accepted,
    NonAuthoritativeInformation,
    NoContent,
    ResetContent,
    PartialContent,
    MultiStatus,
    AlreadyReported,
    ImUsed,
    MultipleChoices,
    MovedPermanently,
    Found,
    SeeOther,
    NotModified,
    UseProxy,
    SwitchProxy,
    TemporaryRedirect,
    PermanentRedirect,
}

impl SuccessStatus {
    /// Every variant in table order.
    pub const ALL: &'static [SuccessStatus] = &[
        SuccessStatus::Continue,
        SuccessStatus::SwitchingProtocols,
        SuccessStatus::Processing,
        SuccessStatus::EarlyHints,
        SuccessStatus::Ok,
        SuccessStatus::Created,
        SuccessStatus::Accepted,
        SuccessStatus::NonAuthoritativeInformation,
        SuccessStatus::NoContent,
        SuccessStatus::ResetContent,
        SuccessStatus::PartialContent,
        SuccessStatus::MultiStatus,
        SuccessStatus::AlreadyReported,
        SuccessStatus::ImUsed,
        SuccessStatus::MultipleChoices,
        SuccessStatus::MovedPermanently,
        SuccessStatus::Found,
        SuccessStatus::SeeOther,
        SuccessStatus::NotModified,
        SuccessStatus::UseProxy,
        SuccessStatus::SwitchProxy,
        SuccessStatus::TemporaryRedirect,
        SuccessStatus::PermanentRedirect,
    ];

    /// Look up the variant for `code`, if the table lists it.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|status| status.code() == code)
    }

    /// The numeric status code.
    pub fn code(self) -> u16 {
        self.entry().0
    }

    /// Short reason phrase.
    pub fn description(self) -> &'static str {
        self.entry().1
    }

    pub fn is_informational(self) -> bool {
        self.code() < 200
    }

    pub fn is_redirection(self) -> bool {
        self.code() >= 300
    }

    fn entry(self) -> (u16, &'static str) {
        use SuccessStatus::*;
        match self {
            Continue => (100, "Continue"),
            SwitchingProtocols => (101, "Switching Protocols"),
            Processing => (102, "Processing"),
            EarlyHints => (103, "Early Hints"),
            Ok => (200, "OK"),
            Created => (201, "Created"),
            Accepted => (202, "Accepted"),
            NonAuthoritativeInformation => (203, "Non-Authoritative Information"),
            NoContent => (204, "No Content"),
            ResetContent => (205, "Reset Content"),
            PartialContent => (206, "Partial Content"),
            MultiStatus => (207, "Multi-Status"),
            AlreadyReported => (208, "Already Reported"),
            ImUsed => (226, "IM Used"),
            MultipleChoices => (300, "Multiple Choices"),
            MovedPermanently => (301, "Moved Permanently"),
            Found => (302, "Found"),
            SeeOther => (303, "See Other"),
            NotModified => (304, "Not Modified"),
            UseProxy => (305, "Use Proxy"),
            SwitchProxy => (306, "Switch Proxy"),
            TemporaryRedirect => (307, "Temporary Redirect"),
            PermanentRedirect => (308, "Permanent Redirect"),
        }
    }
}

impl fmt::Display for SuccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.description())
    }
}

/// Client and server error statuses, including nginx and CDN extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    RequestTimeout,
    Conflict,
    Gone,
    LengthRequired,
    PreconditionFailed,
    PayloadTooLarge,
    UriTooLong,
    UnsupportedMediaType,
    RangeNotSatisfiable,
    ExpectationFailed,
    ImATeapot,
    MisdirectedRequest,
    UnprocessableEntity,
    Locked,
    FailedDependency,
    TooEarly,
    UpgradeRequired,
    PreconditionRequired,
    TooManyRequests,
    RequestHeaderFieldsTooLarge,
    UnavailableForLegalReasons,
    NoResponse,
    RequestHeaderTooLarge,
    SslCertificateError,
    SslCertificateRequired,
    HttpRequestSentToHttpsPort,
    ClientClosedRequest,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    HttpVersionNotSupported,
    VariantAlsoNegotiates,
    InsufficientStorage,
    LoopDetected,
    NotExtended,
    NetworkAuthenticationRequired,
    WebServerReturnedUnknownError,
    WebServerIsDown,
    ConnectionTimedOut,
    OriginIsUnreachable,
    TimeoutOccurred,
    SslHandshakeFailed,
    InvalidSslCertificate,
    RailgunError,
    OriginDnsError,
    NetworkReadTimeout,
    NetworkConnectTimeout,
}

impl ErrorStatus {
    /// Every variant in table order.
    pub const ALL: &'static [ErrorStatus] = &[
        ErrorStatus::BadRequest,
        ErrorStatus::Unauthorized,
        ErrorStatus::PaymentRequired,
        ErrorStatus::Forbidden,
        ErrorStatus::NotFound,
        ErrorStatus::MethodNotAllowed,
        ErrorStatus::NotAcceptable,
        ErrorStatus::ProxyAuthenticationRequired,
        ErrorStatus::RequestTimeout,
        ErrorStatus::Conflict,
        ErrorStatus::Gone,
        ErrorStatus::LengthRequired,
        ErrorStatus::PreconditionFailed,
        ErrorStatus::PayloadTooLarge,
        ErrorStatus::UriTooLong,
        ErrorStatus::UnsupportedMediaType,
        ErrorStatus::RangeNotSatisfiable,
        ErrorStatus::ExpectationFailed,
        ErrorStatus::ImATeapot,
        ErrorStatus::MisdirectedRequest,
        ErrorStatus::UnprocessableEntity,
        ErrorStatus::Locked,
        ErrorStatus::FailedDependency,
        ErrorStatus::TooEarly,
        ErrorStatus::UpgradeRequired,
        ErrorStatus::PreconditionRequired,
        ErrorStatus::TooManyRequests,
        ErrorStatus::RequestHeaderFieldsTooLarge,
        ErrorStatus::UnavailableForLegalReasons,
        ErrorStatus::NoResponse,
        ErrorStatus::RequestHeaderTooLarge,
        ErrorStatus::SslCertificateError,
        ErrorStatus::SslCertificateRequired,
        ErrorStatus::HttpRequestSentToHttpsPort,
        ErrorStatus::ClientClosedRequest,
        ErrorStatus::InternalServerError,
        ErrorStatus::NotImplemented,
        ErrorStatus::BadGateway,
        ErrorStatus::ServiceUnavailable,
        ErrorStatus::GatewayTimeout,
        ErrorStatus::HttpVersionNotSupported,
        ErrorStatus::VariantAlsoNegotiates,
        ErrorStatus::InsufficientStorage,
        ErrorStatus::LoopDetected,
        ErrorStatus::NotExtended,
        ErrorStatus::NetworkAuthenticationRequired,
        ErrorStatus::WebServerReturnedUnknownError,
        ErrorStatus::WebServerIsDown,
        ErrorStatus::ConnectionTimedOut,
        ErrorStatus::OriginIsUnreachable,
        ErrorStatus::TimeoutOccurred,
        ErrorStatus::SslHandshakeFailed,
        ErrorStatus::InvalidSslCertificate,
        ErrorStatus::RailgunError,
        ErrorStatus::OriginDnsError,
        ErrorStatus::NetworkReadTimeout,
        ErrorStatus::NetworkConnectTimeout,
    ];

    /// Look up the variant for `code`, if the table lists it.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|status| status.code() == code)
    }

    /// The numeric status code.
    pub fn code(self) -> u16 {
        self.entry().0
    }

    /// Short reason phrase.
    pub fn description(self) -> &'static str {
        self.entry().1
    }

    /// A longer sentence explaining why the request failed.
    pub fn failure_reason(self) -> &'static str {
        self.entry().2
    }

    /// Whether the code is in the 4xx range.
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.code())
    }

    /// Whether the code is 500 or above.
    pub fn is_server_error(self) -> bool {
        self.code() >= 500
    }

    fn entry(self) -> (u16, &'static str, &'static str) {
        use ErrorStatus::*;
        match self {
            BadRequest => (400, "Bad Request", "The server could not understand the request due to invalid syntax."),
            Unauthorized => (401, "Unauthorized", "The request requires authentication and none was provided or it was rejected."),
            PaymentRequired => (402, "Payment Required", "The requested resource requires payment before it can be accessed."),
            Forbidden => (403, "Forbidden", "The client is authenticated but does not have permission to access the resource."),
            NotFound => (404, "Not Found", "The server could not find the requested resource."),
            MethodNotAllowed => (405, "Method Not Allowed", "The request method is known by the server but not supported by the target resource."),
            NotAcceptable => (406, "Not Acceptable", "The server cannot produce a response matching the Accept headers of the request."),
            ProxyAuthenticationRequired => (407, "Proxy Authentication Required", "The client must authenticate itself with the proxy first."),
            RequestTimeout => (408, "Request Timeout", "The server timed out waiting for the client to finish sending the request."),
            Conflict => (409, "Conflict", "The request conflicts with the current state of the target resource."),
            Gone => (410, "Gone", "The requested resource is no longer available and will not be available again."),
            LengthRequired => (411, "Length Required", "The server requires a Content-Length header that the request did not define."),
            PreconditionFailed => (412, "Precondition Failed", "One or more conditions given in the request headers evaluated to false on the server."),
            PayloadTooLarge => (413, "Payload Too Large", "The request body is larger than the server is willing or able to process."),
            UriTooLong => (414, "URI Too Long", "The request URI is longer than the server is willing to interpret."),
            UnsupportedMediaType => (415, "Unsupported Media Type", "The media format of the request body is not supported by the server."),
            RangeNotSatisfiable => (416, "Range Not Satisfiable", "The range given in the Range header cannot be fulfilled."),
            ExpectationFailed => (417, "Expectation Failed", "The expectation given in the Expect header could not be met by the server."),
            ImATeapot => (418, "I'm a teapot", "The server refuses to brew coffee because it is, permanently, a teapot."),
            MisdirectedRequest => (421, "Misdirected Request", "The request was directed at a server that is not able to produce a response."),
            UnprocessableEntity => (422, "Unprocessable Entity", "The request was well-formed but contained semantic errors the server could not process."),
            Locked => (423, "Locked", "The resource being accessed is locked."),
            FailedDependency => (424, "Failed Dependency", "The request failed because it depended on another request that failed."),
            TooEarly => (425, "Too Early", "The server is unwilling to process a request that might be replayed."),
            UpgradeRequired => (426, "Upgrade Required", "The server refuses the request using the current protocol and requires an upgrade."),
            PreconditionRequired => (428, "Precondition Required", "The origin server requires the request to be conditional."),
            TooManyRequests => (429, "Too Many Requests", "The client has sent too many requests in a given amount of time."),
            RequestHeaderFieldsTooLarge => (431, "Request Header Fields Too Large", "The server refuses the request because its header fields are too large."),
            UnavailableForLegalReasons => (451, "Unavailable For Legal Reasons", "The resource cannot be provided for legal reasons such as censorship or a court order."),
            NoResponse => (444, "No Response", "The server closed the connection without sending any response."),
            RequestHeaderTooLarge => (494, "Request Header Too Large", "The client sent a request header that exceeds the server's limit."),
            SslCertificateError => (495, "SSL Certificate Error", "The client provided an invalid SSL certificate."),
            SslCertificateRequired => (496, "SSL Certificate Required", "The server requires a client certificate and none was provided."),
            HttpRequestSentToHttpsPort => (497, "HTTP Request Sent to HTTPS Port", "A plain HTTP request was sent to a port that only accepts HTTPS."),
            ClientClosedRequest => (499, "Client Closed Request", "The client closed the connection before the server sent a response."),
            InternalServerError => (500, "Internal Server Error", "The server encountered an unexpected condition that prevented it from fulfilling the request."),
            NotImplemented => (501, "Not Implemented", "The server does not support the functionality required to fulfil the request."),
            BadGateway => (502, "Bad Gateway", "The server, acting as a gateway, received an invalid response from the upstream server."),
            ServiceUnavailable => (503, "Service Unavailable", "The server is not ready to handle the request, usually due to maintenance or overload."),
            GatewayTimeout => (504, "Gateway Timeout", "The server, acting as a gateway, did not get a response from the upstream server in time."),
            HttpVersionNotSupported => (505, "HTTP Version Not Supported", "The HTTP version used in the request is not supported by the server."),
            VariantAlsoNegotiates => (506, "Variant Also Negotiates", "The server has an internal configuration error in transparent content negotiation."),
            InsufficientStorage => (507, "Insufficient Storage", "The server is unable to store the representation needed to complete the request."),
            LoopDetected => (508, "Loop Detected", "The server detected an infinite loop while processing the request."),
            NotExtended => (510, "Not Extended", "Further extensions to the request are required for the server to fulfil it."),
            NetworkAuthenticationRequired => (511, "Network Authentication Required", "The client needs to authenticate to gain network access."),
            WebServerReturnedUnknownError => (520, "Web Server Returned an Unknown Error", "The origin server returned an empty, unknown or unexpected response to the CDN."),
            WebServerIsDown => (521, "Web Server Is Down", "The origin server refused the connection from the CDN."),
            ConnectionTimedOut => (522, "Connection Timed Out", "The CDN could not negotiate a TCP handshake with the origin server."),
            OriginIsUnreachable => (523, "Origin Is Unreachable", "The CDN could not reach the origin server, for example because of a DNS error."),
            TimeoutOccurred => (524, "A Timeout Occurred", "The CDN connected to the origin server but did not receive a timely HTTP response."),
            SslHandshakeFailed => (525, "SSL Handshake Failed", "The CDN could not negotiate an SSL/TLS handshake with the origin server."),
            InvalidSslCertificate => (526, "Invalid SSL Certificate", "The CDN could not validate the SSL certificate presented by the origin server."),
            RailgunError => (527, "Railgun Error", "The connection between the CDN and the origin's Railgun server was interrupted."),
            OriginDnsError => (530, "Origin DNS Error", "The CDN could not resolve the origin server's DNS record."),
            NetworkReadTimeout => (598, "Network Read Timeout Error", "A network proxy timed out while reading the response from the upstream server."),
            NetworkConnectTimeout => (599, "Network Connect Timeout Error", "A network proxy timed out while connecting to the upstream server."),
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.description())
    }
}

/// The classification a numeric HTTP status resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Success(SuccessStatus),
    Error(ErrorStatus),
}

impl StatusClass {
    /// Classify `code`.
    ///
    /// The error table is consulted first, then the success table. Unlisted
    /// codes in 100..=399 become [`SuccessStatus::Ok`]; anything else fails
    /// with [`Error::UnrecognizedStatus`].
    pub fn classify(code: u16) -> Result<Self, Error> {
        if let Some(status) = ErrorStatus::from_code(code) {
            return Ok(StatusClass::Error(status));
        }
        if let Some(status) = SuccessStatus::from_code(code) {
            return Ok(StatusClass::Success(status));
        }
        if (100..400).contains(&code) {
            return Ok(StatusClass::Success(SuccessStatus::Ok));
        }
        Err(Error::UnrecognizedStatus { code })
    }

    pub fn code(self) -> u16 {
        match self {
            StatusClass::Success(status) => status.code(),
            StatusClass::Error(status) => status.code(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StatusClass::Success(status) => status.description(),
            StatusClass::Error(status) => status.description(),
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, StatusClass::Success(_))
    }

    pub fn is_error(self) -> bool {
        matches!(self, StatusClass::Error(_))
    }

    /// The error-family variant, if this is one.
    pub fn as_error(self) -> Option<ErrorStatus> {
        match self {
            StatusClass::Error(status) => Some(status),
            StatusClass::Success(_) => None,
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Success(status) => status.fmt(f),
            StatusClass::Error(status) => status.fmt(f),
        }
    }
}
