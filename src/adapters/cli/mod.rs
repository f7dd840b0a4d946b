mod mapper;
