use resources::objects::{
    pod::{self, ContainerPort, IntOrString},
    workload::{HttpGetAction, Probe, StringMap, TcpSocketAction},
};
use strum::Display;

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProbeKind {
    Liveness,
    Readiness,
}

enum Handler<'a> {
    Exec,
    Grpc,
    HttpGet(&'a pod::HttpGetAction),
    TcpSocket(&'a pod::TcpSocketAction),
}

fn handler(probe: &pod::Probe) -> Option<Handler<'_>> {
    if probe.grpc.is_some() {
        Some(Handler::Grpc)
    } else if probe.exec.is_some() {
        Some(Handler::Exec)
    } else if let Some(action) = &probe.http_get {
        Some(Handler::HttpGet(action))
    } else {
        probe.tcp_socket.as_ref().map(Handler::TcpSocket)
    }
}

/// Translate a container probe.
///
/// Exec and gRPC probes have no counterpart on the platform:
/// they are dropped with a diagnostic and the container runs without that probe.
/// A named port must be declared by the container, otherwise this fails.
pub fn translate(
    container: &str,
    kind: ProbeKind,
    probe: Option<&pod::Probe>,
    ports: &[ContainerPort],
    diagnostics: &mut Diagnostics,
) -> Result<Option<Probe>> {
    let probe = match probe {
        Some(probe) => probe,
        None => return Ok(None),
    };

    let mut translated = Probe {
        initial_delay_seconds: probe.initial_delay_seconds,
        timeout_seconds: probe.timeout_seconds,
        period_seconds: probe.period_seconds,
        success_threshold: probe.success_threshold,
        failure_threshold: probe.failure_threshold,
        ..Default::default()
    };
    match handler(probe) {
        Some(Handler::HttpGet(action)) => {
            translated.http_get = Some(HttpGetAction {
                path: action.path.to_owned(),
                port: resolve_port(&action.port, ports)?,
                scheme: action.scheme.to_owned(),
                http_headers: http_headers(&action.http_headers),
            });
        },
        Some(Handler::TcpSocket(action)) => {
            translated.tcp_socket = Some(TcpSocketAction {
                port: resolve_port(&action.port, ports)?,
            });
        },
        Some(Handler::Exec) => return Ok(unsupported(container, kind, "exec", diagnostics)),
        Some(Handler::Grpc) => return Ok(unsupported(container, kind, "grpc", diagnostics)),
        None => return Ok(None),
    }

    Ok(Some(translated))
}

fn unsupported(
    container: &str,
    kind: ProbeKind,
    handler: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<Probe> {
    diagnostics.push(Diagnostic::UnsupportedProbe {
        container: container.to_owned(),
        kind,
        handler,
    });
    None
}

/// A number is used as is, a name is looked up among the container's ports.
pub fn resolve_port(port: &IntOrString, ports: &[ContainerPort]) -> Result<i32> {
    match port {
        IntOrString::Int(number) => Ok(*number),
        IntOrString::String(name) => ports
            .iter()
            .find(|p| p.name == *name)
            .map(|p| p.container_port)
            .filter(|&number| number != 0)
            .ok_or_else(|| Error::NamedPortNotFound(name.to_owned())),
    }
}

/// Repeated header names keep the last value.
fn http_headers(headers: &[pod::HttpHeader]) -> StringMap {
    headers
        .iter()
        .map(|h| (h.name.to_owned(), h.value.to_owned()))
        .collect()
}
